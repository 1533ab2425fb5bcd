//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mailharbor_common::{CycleError, HarborError, Result};
use mailharbor_config::schema::GlobalConfig;
use mailharbor_config::{loader, validation, Coordinator, CredentialStore, DefinitionWatcher};
use mailharbor_platform::paths;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

fn coordinator_for(config_dir: &Path, global: &GlobalConfig) -> Result<Coordinator> {
    let store = CredentialStore::load_or_default(&global.engine.credential_store)?;
    Ok(Coordinator::new(
        config_dir.to_path_buf(),
        store,
        global.engine.status_file.clone(),
    ))
}

/// The daemon: a synthetic startup cycle, then one cycle per debounced
/// definition change, until ctrl-c.
pub async fn run(config_dir: PathBuf) -> Result<()> {
    paths::ensure_dir(&config_dir.join(loader::ACCOUNTS_DIR))?;

    let global = loader::load_global(&config_dir)?;
    let mut coordinator = coordinator_for(&config_dir, &global)?;

    let (tx, rx) = mpsc::channel(16);
    let watcher = DefinitionWatcher::new(
        config_dir,
        Duration::from_millis(global.engine.debounce_ms),
    );
    tokio::spawn(async move {
        if let Err(e) = watcher.watch(tx).await {
            error!("definition watcher stopped: {e}");
        }
    });

    tokio::select! {
        result = coordinator.run(rx) => result.map_err(HarborError::from),
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown requested, abandoning queued cycles");
            Ok(())
        }
    }
}

/// One render/reload cycle, then exit. The container entrypoint runs this
/// before handing off to the process supervisor.
pub async fn init(config_dir: PathBuf) -> Result<()> {
    let global = loader::load_global(&config_dir)?;
    let mut coordinator = coordinator_for(&config_dir, &global)?;
    let outcome = coordinator.run_once().await?;

    if outcome.accounts == 0 {
        return Err(HarborError::Other(
            "no enabled accounts found in configuration".into(),
        ));
    }

    info!(
        "initialized configuration for {} account(s)",
        outcome.accounts
    );
    Ok(())
}

/// Validate the definition set and report every violation; write nothing.
pub fn check(config_dir: PathBuf) -> Result<()> {
    let tree = loader::load_tree(&config_dir)?;

    match validation::validate(&tree.accounts) {
        Ok(accounts) => {
            for advisory in validation::advisories(&tree.global, &accounts) {
                warn!("{advisory}");
            }
            info!("{} account definition(s) valid", accounts.len());
            Ok(())
        }
        Err(errors) => {
            for error in &errors {
                error!("{error}");
            }
            Err(CycleError::Validation(errors).into())
        }
    }
}

/// Print a hash in the same scheme the engine writes to the users file.
pub fn hash_password(password: &str) -> Result<()> {
    let hash = mailharbor_config::credentials::hash_password(password)?;
    println!("{hash}");
    Ok(())
}

//! Core coordinator implementation.
//!
//! Runs the full pipeline for one logical event — load, validate, resolve
//! credentials, render, commit, dry-run check, reload — and enforces that
//! exactly one cycle is active at a time. Any stage failure aborts the
//! cycle and leaves the previously committed, known-good configuration in
//! place; the engine itself survives indefinitely across malformed input.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use mailharbor_common::{CycleError, CycleOutcome, EngineStatus};
use mailharbor_platform::{paths as platform_paths, DaemonControl};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::commit::{self, OutputPaths};
use crate::credentials::{self, CredentialStore, ResolvedAccount};
use crate::schema::GlobalConfig;
use crate::{loader, render, validation};

pub struct Coordinator {
    config_dir: PathBuf,
    store: CredentialStore,
    status: EngineStatus,
    status_file: PathBuf,
}

impl Coordinator {
    pub fn new(config_dir: PathBuf, store: CredentialStore, status_file: PathBuf) -> Self {
        Self {
            config_dir,
            store,
            status: EngineStatus::default(),
            status_file,
        }
    }

    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Consume logical change events, running one cycle per event.
    ///
    /// Events arriving while a cycle runs stay queued in the channel and
    /// are drained into a single follow-up cycle, so a burst of edits
    /// during a long cycle costs one extra cycle, not one per edit.
    /// Returns only when the channel closes or a cycle fails fatally.
    pub async fn run(&mut self, mut rx: mpsc::Receiver<()>) -> Result<(), CycleError> {
        while rx.recv().await.is_some() {
            // Coalesce everything queued since the last cycle started.
            while rx.try_recv().is_ok() {}

            if let Err(e) = self.run_once().await {
                if e.is_fatal() {
                    error!("fatal cycle failure: {e}");
                    return Err(e);
                }
                error!("cycle failed: {e}");
            }
        }
        info!("change channel closed, coordinator stopping");
        Ok(())
    }

    /// Run one cycle and record its outcome in the health snapshot.
    pub async fn run_once(&mut self) -> Result<CycleOutcome, CycleError> {
        let result = self.run_cycle().await;
        self.record(&result);
        result
    }

    /// Run one full cycle. Stages in order; the first failure aborts.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        info!("render cycle started");

        // Load + validate. Pure over the input documents; a bad batch
        // leaves everything untouched.
        let tree = loader::load_tree(&self.config_dir)?;
        let accounts = validation::validate(&tree.accounts).map_err(CycleError::Validation)?;
        for advisory in validation::advisories(&tree.global, &accounts) {
            warn!("{advisory}");
        }

        let enabled: Vec<_> = accounts
            .into_iter()
            .filter(|a| a.document.enabled)
            .collect();

        // Resolve credentials and render both targets from one snapshot.
        let resolved = credentials::resolve(enabled, &mut self.store, &tree.global)?;
        let set = render::render(&resolved, &tree.global)?;

        // Commit atomically, then make the store durable: the hashes just
        // committed must survive a restart or every session would churn.
        let paths = OutputPaths::from_engine(&tree.global.engine);
        let pending = commit::commit(&set, &paths)?;
        self.store
            .persist()
            .map_err(|e| CycleError::Credential(e.to_string()))?;

        ensure_mailbox_dirs(&resolved, &tree.global);

        let files_changed = pending.receipt.files_changed();
        let mut reloaded = false;

        if files_changed {
            let control = daemon_control(&tree.global);

            // Dry-run the committed config before signalling anyone. A
            // rejection restores the pre-cycle files.
            match control.check_dovecot(&paths.dovecot_conf).await {
                Ok(true) => {}
                Ok(false) => {
                    pending.roll_back()?;
                    return Err(CycleError::Check(
                        "dovecot config check rejected the new configuration".into(),
                    ));
                }
                Err(e) => {
                    pending.roll_back()?;
                    return Err(CycleError::Check(e.to_string()));
                }
            }

            // Reload both daemons. Failures here leave the files committed:
            // the config is good, the daemon just has not picked it up.
            let mut failures = Vec::new();
            match control.reload_fetchmail().await {
                Ok(true) => {}
                Ok(false) => failures.push("fetchmail refused the reload signal".to_string()),
                Err(e) => failures.push(e.to_string()),
            }
            match control.reload_dovecot().await {
                Ok(true) => {}
                Ok(false) => failures.push("dovecot refused the reload signal".to_string()),
                Err(e) => failures.push(e.to_string()),
            }
            if !failures.is_empty() {
                return Err(CycleError::Reload(failures.join("; ")));
            }
            reloaded = true;
        } else {
            info!("rendered configuration is byte-identical, reload skipped");
        }

        let outcome = CycleOutcome {
            accounts: resolved.len(),
            files_changed,
            reloaded,
        };
        info!(
            accounts = outcome.accounts,
            files_changed = outcome.files_changed,
            "render cycle complete"
        );
        Ok(outcome)
    }

    /// Update the health snapshot and persist it for the external probe.
    fn record(&mut self, result: &Result<CycleOutcome, CycleError>) {
        match result {
            Ok(outcome) => self.status.record_success(*outcome, Utc::now()),
            Err(e) => {
                // A failed reload means good files are committed but not
                // applied; everything else leaves the prior config active.
                let unapplied = matches!(e, CycleError::Reload(_));
                self.status.record_failure(&e.to_string(), unapplied);
            }
        }
        self.write_status();
    }

    fn write_status(&self) {
        let json = match serde_json::to_vec_pretty(&self.status) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize status: {e}");
                return;
            }
        };
        if let Err(e) = commit::write_atomic(&self.status_file, &json, 0o644) {
            warn!(
                "failed to write status file {}: {e}",
                self.status_file.display()
            );
        }
    }
}

/// Create per-account maildir and FTS directories. Best-effort: in
/// development the spool mount may not exist, and the daemons create
/// missing maildirs themselves on first delivery.
fn ensure_mailbox_dirs(resolved: &[ResolvedAccount], global: &GlobalConfig) {
    for account in resolved {
        if let Err(e) = platform_paths::ensure_maildir(&account.mail_dir) {
            warn!("could not create mailbox for '{}': {e}", account.id());
        }
        if global.dovecot.fts.enabled {
            if let Err(e) = platform_paths::ensure_fts_dir(&account.fts_dir) {
                warn!("could not create fts dir for '{}': {e}", account.id());
            }
        }
    }
}

fn daemon_control(global: &GlobalConfig) -> DaemonControl {
    let engine = &global.engine;
    DaemonControl::new(
        Duration::from_secs(engine.command_timeout_secs),
        engine.dovecot_check_command.clone(),
        engine.dovecot_reload_command.clone(),
        engine.fetchmail_reload_command.clone(),
    )
}

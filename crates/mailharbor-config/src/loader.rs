//! Read the definition tree off disk: `global.yaml` plus `accounts/*.yaml`.
//!
//! Loading is all-or-nothing across the account set. A file that fails to
//! parse fails the whole batch; a silently dropped definition would leave a
//! partially functioning relay the operator does not notice.

use std::path::Path;

use mailharbor_common::CycleError;
use tracing::{info, warn};

use crate::schema::{AccountDocument, GlobalConfig, RawDefinition};

/// Name of the global document inside the definitions directory.
pub const GLOBAL_FILE: &str = "global.yaml";

/// Subdirectory holding per-account definition files.
pub const ACCOUNTS_DIR: &str = "accounts";

/// One consistent snapshot of everything under the definitions directory.
#[derive(Debug, Clone)]
pub struct ConfigTree {
    pub global: GlobalConfig,
    /// Raw account definitions sorted by identifier.
    pub accounts: Vec<RawDefinition>,
}

/// Load `global.yaml`, falling back to defaults with a warning when the
/// file does not exist.
pub fn load_global(config_dir: &Path) -> Result<GlobalConfig, CycleError> {
    let path = config_dir.join(GLOBAL_FILE);
    if !path.exists() {
        warn!(
            "global config not found at {}, using defaults",
            path.display()
        );
        return Ok(GlobalConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| CycleError::Load(format!("failed to read {}: {e}", path.display())))?;
    let global: GlobalConfig = serde_yaml::from_str(&content)
        .map_err(|e| CycleError::Load(format!("failed to parse {}: {e}", path.display())))?;

    info!("loaded global config from {}", path.display());
    Ok(global)
}

/// Load the whole definition tree for one render cycle.
pub fn load_tree(config_dir: &Path) -> Result<ConfigTree, CycleError> {
    let global = load_global(config_dir)?;
    let accounts = load_accounts(config_dir)?;
    info!("loaded {} account definition(s)", accounts.len());
    Ok(ConfigTree { global, accounts })
}

/// Load every `*.yaml`/`*.yml` under `accounts/`, keyed by file stem.
pub fn load_accounts(config_dir: &Path) -> Result<Vec<RawDefinition>, CycleError> {
    let dir = config_dir.join(ACCOUNTS_DIR);
    if !dir.is_dir() {
        warn!("accounts directory not found at {}", dir.display());
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(&dir)
        .map_err(|e| CycleError::Load(format!("failed to read {}: {e}", dir.display())))?;

    let mut accounts = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| CycleError::Load(format!("failed to read {}: {e}", dir.display())))?;
        let path = entry.path();
        if !is_definition_file(&path) {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Err(CycleError::Load(format!(
                "definition file {} has a non-UTF-8 name",
                path.display()
            )));
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(stem)
            .to_string();

        let content = std::fs::read_to_string(&path)
            .map_err(|e| CycleError::Load(format!("failed to read {}: {e}", path.display())))?;
        let document: AccountDocument = serde_yaml::from_str(&content)
            .map_err(|e| CycleError::Load(format!("failed to parse {}: {e}", path.display())))?;

        accounts.push(RawDefinition {
            id: stem.to_string(),
            file_name,
            document,
        });
    }

    // Deterministic processing order regardless of directory iteration order.
    accounts.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.file_name.cmp(&b.file_name)));
    Ok(accounts)
}

/// True for regular `.yaml`/`.yml` files, ignoring editor droppings.
pub fn is_definition_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

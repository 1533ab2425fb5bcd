//! The credential store: the compiler's only cross-cycle state.
//!
//! A versioned JSON file mapping account identifier to password hash plus
//! plaintext fingerprint. Loaded once at startup, mutated only inside the
//! active cycle, persisted after every successful render cycle.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mailharbor_common::HarborError;
use serde::{Deserialize, Serialize};
use tracing::info;

const STORE_VERSION: u32 = 1;

/// One stored credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Dovecot-syntax hash, preserved byte-for-byte while the plaintext is
    /// unchanged.
    pub hash: String,
    /// FNV-1a fingerprint of the plaintext the hash was derived from.
    pub fingerprint: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: BTreeMap<String, StoredCredential>,
}

/// Durable identifier → credential map.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    entries: BTreeMap<String, StoredCredential>,
}

impl CredentialStore {
    /// Load the store from `path`, or start empty when the file does not
    /// exist yet. A corrupt or future-versioned store is an error, not a
    /// silent reset: resetting would churn every credential.
    pub fn load_or_default(path: &Path) -> Result<Self, HarborError> {
        if !path.exists() {
            info!("no credential store at {}, starting empty", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                entries: BTreeMap::new(),
            });
        }

        let data = std::fs::read_to_string(path).map_err(|e| HarborError::State {
            path: path.to_path_buf(),
            message: format!("read failed: {e}"),
        })?;
        let file: StoreFile = serde_json::from_str(&data).map_err(|e| HarborError::State {
            path: path.to_path_buf(),
            message: format!("parse failed: {e}"),
        })?;
        if file.version != STORE_VERSION {
            return Err(HarborError::State {
                path: path.to_path_buf(),
                message: format!("unsupported store version: {}", file.version),
            });
        }

        info!(
            "loaded credential store with {} entr(ies) from {}",
            file.entries.len(),
            path.display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            entries: file.entries,
        })
    }

    pub fn get(&self, id: &str) -> Option<&StoredCredential> {
        self.entries.get(id)
    }

    pub fn insert(&mut self, id: &str, credential: StoredCredential) {
        self.entries.insert(id.to_string(), credential);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries for accounts no longer in the definition set.
    pub fn retain_ids<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = ids.into_iter().collect();
        let before = self.entries.len();
        self.entries.retain(|id, _| keep.contains(id.as_str()));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            info!("pruned {dropped} stale credential entr(ies)");
        }
    }

    /// Persist the store, 0600, creating parent directories as needed.
    pub fn persist(&self) -> Result<(), HarborError> {
        let file = StoreFile {
            version: STORE_VERSION,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| HarborError::State {
            path: self.path.clone(),
            message: format!("serialize failed: {e}"),
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HarborError::State {
                path: self.path.clone(),
                message: format!("failed to create {}: {e}", parent.display()),
            })?;
        }

        // The store holds no plaintext, but hashes are still not for
        // other users' eyes.
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;
            let mut opts = std::fs::OpenOptions::new();
            opts.write(true).create(true).truncate(true).mode(0o600);
            let mut f = opts.open(&self.path).map_err(|e| HarborError::State {
                path: self.path.clone(),
                message: format!("open failed: {e}"),
            })?;
            f.write_all(json.as_bytes()).map_err(|e| HarborError::State {
                path: self.path.clone(),
                message: format!("write failed: {e}"),
            })?;
        }
        #[cfg(not(unix))]
        {
            std::fs::write(&self.path, &json).map_err(|e| HarborError::State {
                path: self.path.clone(),
                message: format!("write failed: {e}"),
            })?;
        }

        Ok(())
    }
}

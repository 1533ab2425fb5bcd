//! Credential lifecycle: resolve validated definitions into accounts with
//! stable password hashes.
//!
//! A hash is reused byte-for-byte across cycles while the plaintext is
//! unchanged, so unrelated re-renders neither churn credentials nor
//! invalidate sessions keyed to the old hash.

mod fingerprint;
pub mod hash;
mod store;

pub use fingerprint::fingerprint;
pub use hash::hash_password;
pub use store::{CredentialStore, StoredCredential};

use std::path::PathBuf;

use mailharbor_common::CycleError;
use tracing::debug;

use crate::schema::{AccountDefinition, GlobalConfig};

/// An account definition plus everything derived for rendering: the
/// password-hash record and resolved storage paths.
#[derive(Debug, Clone)]
pub struct ResolvedAccount {
    pub definition: AccountDefinition,
    /// Dovecot-syntax password hash for the local credential.
    pub hash: String,
    /// Maildir root for this mailbox.
    pub mail_dir: PathBuf,
    /// Full-text index directory for this mailbox.
    pub fts_dir: PathBuf,
}

impl ResolvedAccount {
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn local_identity(&self) -> String {
        self.definition.local_identity()
    }
}

/// Resolve every definition against the store. New or changed plaintexts
/// get a fresh hash written into the store; unchanged ones reuse the stored
/// hash. Stale store entries are pruned. Hashing failure aborts with the
/// store's new entries still unpersisted (persist happens after commit).
pub fn resolve(
    definitions: Vec<AccountDefinition>,
    store: &mut CredentialStore,
    global: &GlobalConfig,
) -> Result<Vec<ResolvedAccount>, CycleError> {
    let mut resolved = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let plain = &definition.document.account.password;
        let fp = fingerprint(plain);

        let hash = match store.get(&definition.id) {
            Some(entry) if entry.fingerprint == fp => entry.hash.clone(),
            _ => {
                debug!("deriving new credential hash for '{}'", definition.id);
                let hash = hash_password(plain)?;
                store.insert(
                    &definition.id,
                    StoredCredential {
                        hash: hash.clone(),
                        fingerprint: fp,
                    },
                );
                hash
            }
        };

        let identity = definition.local_identity();
        let mail_dir = global.engine.mail_root.join(&identity);
        let fts_dir = global.engine.fts_root.join(&identity);

        resolved.push(ResolvedAccount {
            definition,
            hash,
            mail_dir,
            fts_dir,
        });
    }

    store.retain_ids(resolved.iter().map(|a| a.id()));
    Ok(resolved)
}

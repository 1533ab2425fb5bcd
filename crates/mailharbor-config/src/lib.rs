//! MailHarbor's account-definition compiler.
//!
//! Watches a directory of per-account YAML definitions, validates the whole
//! set, resolves local mailbox credentials to stable password hashes, and
//! renders mutually consistent fetchmail and Dovecot configuration files
//! that are committed atomically before the daemons are told to reload.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use mailharbor_config::{Coordinator, CredentialStore};
//!
//! # async fn demo() -> mailharbor_common::Result<()> {
//! let config_dir = PathBuf::from("/config");
//! let store = CredentialStore::load_or_default(
//!     &PathBuf::from("/var/lib/mailharbor/credentials.json"),
//! )?;
//! let mut coordinator = Coordinator::new(
//!     config_dir,
//!     store,
//!     PathBuf::from("/var/lib/mailharbor/status.json"),
//! );
//! coordinator.run_cycle().await?;
//! # Ok(())
//! # }
//! ```

pub mod commit;
pub mod credentials;
pub mod cycle;
pub mod loader;
pub mod render;
pub mod schema;
pub mod validation;
pub mod watcher;

// Re-export core types for convenience
pub use credentials::{CredentialStore, ResolvedAccount};
pub use cycle::Coordinator;
pub use render::RenderedConfigSet;
pub use schema::{AccountDefinition, GlobalConfig};
pub use watcher::DefinitionWatcher;

//! Error taxonomy shared across the workspace.
//!
//! Every failure a render cycle can hit maps to one [`CycleError`] variant,
//! so operators can tell "bad definitions" from "bad config written" from
//! "good config written but daemon refused it".

use std::path::PathBuf;

/// A single rule violation found while validating the account-definition set.
///
/// Validation is all-or-nothing: one violation rejects the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("account '{id}': missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("duplicate account identifier '{id}' ({first} vs {second})")]
    DuplicateId {
        id: String,
        first: String,
        second: String,
    },

    #[error("account '{id}': local username '{username}' is not a valid mailbox name")]
    InvalidUsername { id: String, username: String },

    #[error("accounts '{first}' and '{second}' both claim local username '{username}'")]
    DuplicateUsername {
        first: String,
        second: String,
        username: String,
    },

    #[error("account '{id}': port {port} is out of range [1, 65535]")]
    InvalidPort { id: String, port: u32 },

    #[error("account '{id}': unknown protocol '{protocol}' (expected 'imap' or 'pop3')")]
    InvalidProtocol { id: String, protocol: String },

    #[error("account '{id}': field '{field}' contains control characters")]
    UnsafeField { id: String, field: &'static str },
}

/// Join a batch of validation errors into one log-friendly line.
pub fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of one render/reload cycle. All variants are local to the cycle;
/// the engine logs them and keeps running with the prior committed config,
/// except [`CycleError::Unrecoverable`] which the caller must treat as fatal.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("failed to load definitions: {0}")]
    Load(String),

    #[error("validation rejected the account set: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("credential resolution failed: {0}")]
    Credential(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("commit failed: {0}")]
    Commit(String),

    #[error("config check rejected the committed set ({0}); previous configuration restored")]
    Check(String),

    #[error("daemon reload failed: {0}")]
    Reload(String),

    #[error("watch error: {0}")]
    Watch(String),

    #[error("unrecoverable commit failure: {0}")]
    Unrecoverable(String),
}

impl CycleError {
    /// True when the consistency invariant can no longer be guaranteed and
    /// the process must exit instead of waiting for the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CycleError::Unrecoverable(_))
    }
}

/// OS-facing failures: path resolution, directory creation, external
/// process invocation.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("path error: {0}")]
    PathError(String),

    #[error("process error: {0}")]
    ProcessError(String),

    #[error("process timed out: {0}")]
    Timeout(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HarborError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("state file error at {path}: {message}")]
    State { path: PathBuf, message: String },

    #[error("{0}")]
    Other(String),
}

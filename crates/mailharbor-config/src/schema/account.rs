//! Per-account definition documents.
//!
//! One YAML file per mailbox under `accounts/`; the file stem is the
//! account's stable identifier.

use serde::{Deserialize, Serialize};

/// One account-definition document, exactly as parsed from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountDocument {
    /// Disabled accounts are validated but not rendered.
    pub enabled: bool,
    pub account: LocalAccount,
    pub source: RemoteSource,
    pub fetch: FetchOptions,
}

impl Default for AccountDocument {
    fn default() -> Self {
        Self {
            enabled: true,
            account: LocalAccount::default(),
            source: RemoteSource::default(),
            fetch: FetchOptions::default(),
        }
    }
}

/// The local delivery identity and its access credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalAccount {
    /// Local mailbox name (lowercase alphanumeric plus `.`/`_`/`-`,
    /// no leading digit).
    pub username: String,
    /// Optional virtual domain; when set, the mail-server identity is
    /// `username@domain`.
    pub domain: String,
    /// Plaintext access credential. Present only in the source document
    /// and transiently in memory; never rendered, persisted, or logged.
    pub password: String,
}

/// The external mailbox to relay from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSource {
    /// `imap` or `pop3`.
    pub protocol: String,
    pub host: String,
    pub port: u32,
    pub ssl: bool,
    pub username: String,
    pub password: String,
}

impl Default for RemoteSource {
    fn default() -> Self {
        Self {
            protocol: String::new(),
            host: String::new(),
            port: 0,
            ssl: true,
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Per-account fetch overrides. Unset fields fall back to the global
/// fetchmail section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    /// Keep fetched mail on the remote server (retention override).
    pub keep_mail: Option<bool>,
    /// Maximum messages fetched per poll.
    pub batch_limit: u32,
    /// Remote folders to fetch (IMAP only).
    pub folders: Vec<String>,
    /// Polling interval override in seconds.
    pub poll_interval: Option<u64>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            keep_mail: None,
            batch_limit: 100,
            folders: vec!["INBOX".into()],
            poll_interval: None,
        }
    }
}

/// A validated account definition: identifier plus document.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountDefinition {
    /// Stable identifier: the definition file's stem, unique across the set.
    pub id: String,
    pub document: AccountDocument,
}

impl AccountDefinition {
    /// The identity this account occupies in the mail-server namespace:
    /// `username` or `username@domain`.
    pub fn local_identity(&self) -> String {
        let local = &self.document.account;
        if local.domain.is_empty() {
            local.username.clone()
        } else {
            format!("{}@{}", local.username, local.domain)
        }
    }
}

/// A definition as loaded from disk, before validation. Keeps the source
/// file name so batch errors can point at the offending file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDefinition {
    pub id: String,
    pub file_name: String,
    pub document: AccountDocument,
}

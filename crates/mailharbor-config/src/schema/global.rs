//! The optional `global.yaml` document: daemon-wide settings and the
//! engine's own paths and commands.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root of `global.yaml`. A missing file means all defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub dovecot: DovecotSection,
    pub fetchmail: FetchmailSection,
    pub engine: EngineSection,
}

/// Settings projected into `dovecot.conf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DovecotSection {
    pub imap_port: u16,
    pub imaps_port: u16,
    pub lmtp_port: u16,
    /// PEM certificate path; IMAPS stays disabled while unset.
    pub ssl_cert: String,
    pub ssl_key: String,
    /// Uid/gid owning all virtual mailboxes.
    pub vmail_uid: u32,
    pub vmail_gid: u32,
    pub fts: FtsSection,
}

impl Default for DovecotSection {
    fn default() -> Self {
        Self {
            imap_port: 143,
            imaps_port: 993,
            lmtp_port: 24,
            ssl_cert: String::new(),
            ssl_key: String::new(),
            vmail_uid: 5000,
            vmail_gid: 5000,
            fts: FtsSection::default(),
        }
    }
}

/// Full-text search enablement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FtsSection {
    pub enabled: bool,
    pub autoindex: bool,
}

impl Default for FtsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            autoindex: true,
        }
    }
}

/// Settings projected into the fetchmailrc preamble, and the defaults
/// per-account `fetch` sections fall back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchmailSection {
    /// Daemon poll interval in seconds.
    pub poll_interval: u64,
    pub syslog: bool,
    /// Default retention: keep fetched mail on the remote server.
    pub keep_mail: bool,
    pub postmaster: String,
}

impl Default for FetchmailSection {
    fn default() -> Self {
        Self {
            poll_interval: 300,
            syslog: false,
            keep_mail: true,
            postmaster: "postmaster".into(),
        }
    }
}

/// The engine's own knobs: output paths, state paths, debounce window and
/// daemon control commands. Defaults match the container layout; tests and
/// development deployments override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub fetchmailrc: PathBuf,
    pub dovecot_conf: PathBuf,
    pub dovecot_users: PathBuf,
    /// The compiler's own memory; not mail-server-readable config.
    pub credential_store: PathBuf,
    pub status_file: PathBuf,
    pub mail_root: PathBuf,
    pub fts_root: PathBuf,
    /// Raw filesystem events within this window collapse into one cycle.
    pub debounce_ms: u64,
    /// Bound on every spawned daemon-control command.
    pub command_timeout_secs: u64,
    /// Dovecot dry-run check; the committed config path is appended.
    /// Empty argv disables the call.
    pub dovecot_check_command: Vec<String>,
    pub dovecot_reload_command: Vec<String>,
    pub fetchmail_reload_command: Vec<String>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            fetchmailrc: "/etc/fetchmailrc".into(),
            dovecot_conf: "/etc/dovecot/dovecot.conf".into(),
            dovecot_users: "/etc/dovecot/users".into(),
            credential_store: "/var/lib/mailharbor/credentials.json".into(),
            status_file: "/var/lib/mailharbor/status.json".into(),
            mail_root: "/data/mail".into(),
            fts_root: "/data/fts".into(),
            debounce_ms: 500,
            command_timeout_secs: 5,
            dovecot_check_command: vec!["doveconf".into(), "-n".into(), "-c".into()],
            dovecot_reload_command: vec!["doveadm".into(), "reload".into()],
            fetchmail_reload_command: vec![
                "pkill".into(),
                "-HUP".into(),
                "-x".into(),
                "fetchmail".into(),
            ],
        }
    }
}

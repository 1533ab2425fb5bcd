//! Cycle outcome and engine health types.
//!
//! [`EngineStatus`] is the liveness/readiness snapshot rewritten after every
//! cycle; an external probe reads it off disk instead of the engine serving
//! a network endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one successful render/reload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleOutcome {
    /// Number of enabled accounts in the rendered snapshot.
    pub accounts: usize,
    /// Whether any target file's bytes actually changed this cycle.
    pub files_changed: bool,
    /// Whether the downstream daemons were signalled to reload.
    pub reloaded: bool,
}

/// Health snapshot persisted to the status file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Total cycles attempted since startup.
    pub cycles_run: u64,
    /// Timestamp of the last fully successful cycle.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Outcome of the last successful cycle.
    pub last_outcome: Option<CycleOutcome>,
    /// Error message of the most recent failed cycle, cleared on success.
    pub last_error: Option<String>,
    /// True when config files are committed but a daemon refused the reload
    /// signal; cleared by the next fully successful cycle.
    pub unapplied: bool,
}

impl EngineStatus {
    pub fn record_success(&mut self, outcome: CycleOutcome, at: DateTime<Utc>) {
        self.cycles_run += 1;
        self.last_success_at = Some(at);
        self.last_outcome = Some(outcome);
        self.last_error = None;
        self.unapplied = false;
    }

    pub fn record_failure(&mut self, error: &str, unapplied: bool) {
        self.cycles_run += 1;
        self.last_error = Some(error.to_string());
        if unapplied {
            self.unapplied = true;
        }
    }

    /// Ready means the engine has produced at least one good config set and
    /// the daemons accepted it.
    pub fn is_ready(&self) -> bool {
        self.last_success_at.is_some() && !self.unapplied
    }
}

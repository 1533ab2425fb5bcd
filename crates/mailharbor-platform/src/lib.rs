//! OS-facing glue for MailHarbor.
//!
//! Path resolution and directory creation for the mail spool, the full-text
//! index and the engine's own state, plus control of the external mail
//! daemons (config dry-run check and reload signalling) via spawned
//! commands with bounded timeouts.

pub mod paths;
pub mod process;

pub use process::DaemonControl;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// MailHarbor — aggregates external mailboxes into one locally served
/// mailbox system, driven by declarative account definitions.
#[derive(Parser, Debug)]
#[command(name = "mailharbor", version, about)]
pub struct Args {
    /// Definitions directory (holds global.yaml and accounts/).
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Log filter override (e.g. debug, mailharbor=trace).
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the engine: render once, then watch for definition changes.
    Run,
    /// Render and apply one cycle, then exit (container entrypoint).
    Init,
    /// Validate the account definitions without writing anything.
    Check,
    /// Print a Dovecot-syntax PBKDF2 hash for a password.
    HashPassword {
        /// The plaintext to hash.
        password: String,
    },
}

pub fn parse() -> Args {
    Args::parse()
}

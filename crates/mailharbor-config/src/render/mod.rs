//! Projection of one resolved-account snapshot into every target config.
//!
//! Pure and deterministic: the same resolved set always produces
//! byte-identical output, so a cosmetic re-render never triggers a reload
//! and idempotence is directly testable. Stanza order is the account
//! identifier's lexical order to keep diffs stable.

mod dovecot;
mod escape;
mod fetchmail;

#[cfg(test)]
mod tests;

use mailharbor_common::CycleError;

use crate::credentials::ResolvedAccount;
use crate::schema::GlobalConfig;

/// Banner at the top of every generated file.
pub(crate) const GENERATED_HEADER: &str =
    "# Generated by mailharbor; do not edit. Changes here are overwritten\n\
     # whenever the account definitions change.\n";

/// The target config bodies for one consistent snapshot. Only ever
/// committed to disk as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConfigSet {
    pub fetchmailrc: String,
    pub dovecot_conf: String,
    pub dovecot_users: String,
}

/// Render every target from the same snapshot.
pub fn render(
    accounts: &[ResolvedAccount],
    global: &GlobalConfig,
) -> Result<RenderedConfigSet, CycleError> {
    // Defensive ordering: the validator already sorts, but determinism is
    // this function's contract.
    let mut ordered: Vec<&ResolvedAccount> = accounts.iter().collect();
    ordered.sort_by(|a, b| a.id().cmp(b.id()));
    let ordered: Vec<ResolvedAccount> = ordered.into_iter().cloned().collect();

    Ok(RenderedConfigSet {
        fetchmailrc: fetchmail::render_fetchmailrc(&ordered, global)?,
        dovecot_conf: dovecot::render_conf(global)?,
        dovecot_users: dovecot::render_users(&ordered, global)?,
    })
}

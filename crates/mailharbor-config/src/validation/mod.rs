//! Account-set validation.
//!
//! All-or-nothing over the whole batch: a single bad definition rejects the
//! set and the prior committed configuration stays in place. Each domain has
//! its own submodule; this orchestrator calls them all and collects every
//! violation before failing, so the operator sees the full list at once.

mod identity;
mod source;
mod username;


use mailharbor_common::ValidationError;
use tracing::debug;

use crate::schema::{AccountDefinition, GlobalConfig, RawDefinition};

/// Validate the raw definition set into account definitions, sorted by
/// identifier. Pure: no filesystem access, no side effects.
pub fn validate(raw: &[RawDefinition]) -> Result<Vec<AccountDefinition>, Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = Vec::new();

    identity::validate_unique_ids(&mut errors, raw);

    for def in raw {
        source::validate_source(&mut errors, def);
        username::validate_username(&mut errors, def);
    }

    username::validate_unique_usernames(&mut errors, raw);

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut accounts: Vec<AccountDefinition> = raw
        .iter()
        .map(|def| AccountDefinition {
            id: def.id.clone(),
            document: def.document.clone(),
        })
        .collect();
    accounts.sort_by(|a, b| a.id.cmp(&b.id));

    debug!("validated {} account definition(s)", accounts.len());
    Ok(accounts)
}

/// Non-fatal security advisories, logged by the caller at warn level.
/// Unlike [`validate`], this may look at the filesystem (certificate paths).
pub fn advisories(global: &GlobalConfig, accounts: &[AccountDefinition]) -> Vec<String> {
    let mut warnings = Vec::new();

    let cert = &global.dovecot.ssl_cert;
    let key = &global.dovecot.ssl_key;
    if cert.is_empty() || key.is_empty() {
        warnings.push("SSL certificates not configured; IMAPS will stay disabled".into());
    } else {
        if !std::path::Path::new(cert).exists() {
            warnings.push(format!("SSL certificate file not found: {cert}"));
        }
        if !std::path::Path::new(key).exists() {
            warnings.push(format!("SSL key file not found: {key}"));
        }
    }

    for account in accounts {
        if !account.document.source.ssl {
            warnings.push(format!(
                "account '{}' polls {} without TLS",
                account.id, account.document.source.host
            ));
        }
    }

    warnings
}

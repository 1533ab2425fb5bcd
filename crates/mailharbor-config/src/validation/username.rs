//! Local mailbox name checks: syntax, and uniqueness across the whole set.
//!
//! Two accounts sharing a local identity would collide in the mail-server
//! namespace, so duplicates reject the batch even when the identifiers
//! differ.

use std::collections::HashMap;
use std::sync::LazyLock;

use mailharbor_common::ValidationError;
use regex::Regex;

use crate::schema::RawDefinition;

/// Lowercase alphanumeric plus `.`/`_`/`-`, no leading digit, max 32 chars.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9._-]{0,31}$").unwrap());

pub(crate) fn validate_username(errors: &mut Vec<ValidationError>, def: &RawDefinition) {
    let username = &def.document.account.username;
    if username.is_empty() {
        // Reported as a missing field by the source checks.
        return;
    }
    if !USERNAME_RE.is_match(username) {
        errors.push(ValidationError::InvalidUsername {
            id: def.id.clone(),
            username: username.clone(),
        });
    }
}

pub(crate) fn validate_unique_usernames(
    errors: &mut Vec<ValidationError>,
    raw: &[RawDefinition],
) {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for def in raw {
        let account = &def.document.account;
        if account.username.is_empty() {
            continue;
        }
        let identity = if account.domain.is_empty() {
            account.username.clone()
        } else {
            format!("{}@{}", account.username, account.domain)
        };

        if let Some(first) = seen.get(identity.as_str()) {
            errors.push(ValidationError::DuplicateUsername {
                first: (*first).to_string(),
                second: def.id.clone(),
                username: identity,
            });
        } else {
            seen.insert(identity, &def.id);
        }
    }
}

//! External-source checks: required fields, port range, protocol enum, and
//! the renderability contract (no control characters in any field that gets
//! interpolated into a config syntax).

use mailharbor_common::ValidationError;

use crate::schema::RawDefinition;

const PROTOCOLS: [&str; 2] = ["imap", "pop3"];

pub(crate) fn validate_source(errors: &mut Vec<ValidationError>, def: &RawDefinition) {
    let source = &def.document.source;
    let account = &def.document.account;

    require(errors, def, "source.host", &source.host);
    require(errors, def, "source.username", &source.username);
    require(errors, def, "source.password", &source.password);
    require(errors, def, "account.username", &account.username);
    require(errors, def, "account.password", &account.password);

    if source.protocol.is_empty() {
        errors.push(ValidationError::MissingField {
            id: def.id.clone(),
            field: "source.protocol",
        });
    } else if !PROTOCOLS.contains(&source.protocol.as_str()) {
        errors.push(ValidationError::InvalidProtocol {
            id: def.id.clone(),
            protocol: source.protocol.clone(),
        });
    }

    if source.port == 0 {
        errors.push(ValidationError::MissingField {
            id: def.id.clone(),
            field: "source.port",
        });
    } else if source.port > u32::from(u16::MAX) {
        errors.push(ValidationError::InvalidPort {
            id: def.id.clone(),
            port: source.port,
        });
    }

    // Fields rendered into fetchmailrc or the passwd-file must not be able
    // to alter adjacent stanzas.
    reject_control_chars(errors, def, "source.host", &source.host);
    reject_control_chars(errors, def, "source.username", &source.username);
    reject_control_chars(errors, def, "source.password", &source.password);
    reject_control_chars(errors, def, "account.domain", &account.domain);
    for folder in &def.document.fetch.folders {
        reject_control_chars(errors, def, "fetch.folders", folder);
    }
}

fn require(
    errors: &mut Vec<ValidationError>,
    def: &RawDefinition,
    field: &'static str,
    value: &str,
) {
    if value.is_empty() {
        errors.push(ValidationError::MissingField {
            id: def.id.clone(),
            field,
        });
    }
}

fn reject_control_chars(
    errors: &mut Vec<ValidationError>,
    def: &RawDefinition,
    field: &'static str,
    value: &str,
) {
    if value.chars().any(char::is_control) {
        errors.push(ValidationError::UnsafeField {
            id: def.id.clone(),
            field,
        });
    }
}

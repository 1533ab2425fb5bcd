//! Escaping contract for interpolated fields.
//!
//! Every value that lands in a rendered config goes through exactly one of
//! these functions, each naming the syntax it protects. Validation already
//! rejects control characters; these checks are the renderer's own
//! guarantee, so a projection bug cannot silently smuggle a field into
//! config syntax it would alter.

use mailharbor_common::CycleError;

/// Double-quoted fetchmailrc string: backslashes and quotes escaped,
/// control characters unrepresentable.
pub(crate) fn quoted(field: &str, value: &str) -> Result<String, CycleError> {
    if value.chars().any(char::is_control) {
        return Err(CycleError::Render(format!(
            "{field} contains control characters and cannot be quoted"
        )));
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    Ok(out)
}

/// Bare fetchmailrc token (the poll hostname): restricted to hostname
/// characters, no quoting needed or possible.
pub(crate) fn host_token<'a>(field: &str, value: &'a str) -> Result<&'a str, CycleError> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if !ok {
        return Err(CycleError::Render(format!(
            "{field} '{value}' is not a plain hostname"
        )));
    }
    Ok(value)
}

/// Colon-separated passwd-file field: `:` would shift every following
/// field, newlines would open a new user entry.
pub(crate) fn passwd_field<'a>(field: &str, value: &'a str) -> Result<&'a str, CycleError> {
    if value.contains(':') || value.chars().any(char::is_control) {
        return Err(CycleError::Render(format!(
            "{field} cannot be represented in a passwd-file field"
        )));
    }
    Ok(value)
}

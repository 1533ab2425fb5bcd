//! Projection into fetchmailrc: one poll stanza per account, keyed by
//! external-source identity.

use mailharbor_common::CycleError;

use crate::credentials::ResolvedAccount;
use crate::schema::GlobalConfig;

use super::escape::{host_token, quoted};
use super::GENERATED_HEADER;

pub(crate) fn render_fetchmailrc(
    accounts: &[ResolvedAccount],
    global: &GlobalConfig,
) -> Result<String, CycleError> {
    let fm = &global.fetchmail;
    let mut out = String::new();

    out.push_str(GENERATED_HEADER);
    out.push_str(&format!("set daemon {}\n", fm.poll_interval));
    out.push_str(&format!(
        "set postmaster {}\n",
        quoted("fetchmail.postmaster", &fm.postmaster)?
    ));
    out.push_str("set no bouncemail\n");
    if fm.syslog {
        out.push_str("set syslog\n");
    }

    for account in accounts {
        out.push('\n');
        out.push_str(&poll_stanza(account, global)?);
    }

    Ok(out)
}

fn poll_stanza(account: &ResolvedAccount, global: &GlobalConfig) -> Result<String, CycleError> {
    let doc = &account.definition.document;
    let source = &doc.source;
    let fetch = &doc.fetch;
    let id = account.id();

    let mut out = String::new();

    out.push_str(&format!(
        "poll {} protocol {} port {}",
        host_token(&format!("account '{id}' source.host"), &source.host)?,
        source.protocol.to_uppercase(),
        source.port,
    ));
    if let Some(skip) = interval_multiplier(fetch.poll_interval, global.fetchmail.poll_interval) {
        out.push_str(&format!(" interval {skip}"));
    }
    out.push('\n');

    out.push_str(&format!(
        "    user {} there with password {} is {} here\n",
        quoted(&format!("account '{id}' source.username"), &source.username)?,
        quoted(&format!("account '{id}' source.password"), &source.password)?,
        quoted(
            &format!("account '{id}' local identity"),
            &account.local_identity()
        )?,
    ));

    if source.ssl {
        out.push_str("    ssl\n");
    }
    if fetch.keep_mail.unwrap_or(global.fetchmail.keep_mail) {
        out.push_str("    keep\n");
    } else {
        out.push_str("    no keep\n");
    }
    out.push_str(&format!("    fetchlimit {}\n", fetch.batch_limit));

    // Folder selection only exists for IMAP sources.
    if source.protocol == "imap" && !fetch.folders.is_empty() {
        let mut folders = Vec::with_capacity(fetch.folders.len());
        for folder in &fetch.folders {
            folders.push(quoted(&format!("account '{id}' fetch.folders"), folder)?);
        }
        out.push_str(&format!("    folder {}\n", folders.join(" ")));
    }

    Ok(out)
}

/// fetchmail expresses per-server cadence as "only poll this server every
/// N-th daemon cycle". `None` means every cycle (no `interval` keyword).
fn interval_multiplier(account_secs: Option<u64>, daemon_secs: u64) -> Option<u64> {
    let account_secs = account_secs?;
    let daemon_secs = daemon_secs.max(1);
    let skip = ((account_secs as f64 / daemon_secs as f64).round() as u64).max(1);
    (skip > 1).then_some(skip)
}

#[cfg(test)]
mod tests {
    use super::interval_multiplier;

    #[test]
    fn no_override_means_every_cycle() {
        assert_eq!(interval_multiplier(None, 300), None);
    }

    #[test]
    fn override_rounds_to_nearest_multiple() {
        assert_eq!(interval_multiplier(Some(600), 300), Some(2));
        assert_eq!(interval_multiplier(Some(900), 300), Some(3));
        assert_eq!(interval_multiplier(Some(700), 300), Some(2));
    }

    #[test]
    fn override_at_or_below_daemon_interval_is_dropped() {
        assert_eq!(interval_multiplier(Some(300), 300), None);
        assert_eq!(interval_multiplier(Some(30), 300), None);
    }

    #[test]
    fn zero_daemon_interval_does_not_divide_by_zero() {
        assert_eq!(interval_multiplier(Some(10), 0), Some(10));
    }
}

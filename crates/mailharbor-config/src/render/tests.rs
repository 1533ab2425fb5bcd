//! Tests for the target-config projections.

use super::*;
use crate::credentials::{resolve, CredentialStore};
use crate::schema::{AccountDefinition, AccountDocument, GlobalConfig};

fn definition(id: &str, proto: &str, host: &str, port: u32) -> AccountDefinition {
    let mut document = AccountDocument::default();
    document.account.username = id.into();
    document.account.password = format!("{id}-secret");
    document.source.protocol = proto.into();
    document.source.host = host.into();
    document.source.port = port;
    document.source.username = format!("{id}@{host}");
    document.source.password = format!("{id}-remote");
    AccountDefinition {
        id: id.into(),
        document,
    }
}

fn alice_and_bob() -> Vec<AccountDefinition> {
    vec![
        definition("alice", "imap", "imap.example.com", 993),
        definition("bob", "pop3", "pop.example.org", 995),
    ]
}

fn resolved(
    defs: Vec<AccountDefinition>,
    global: &GlobalConfig,
) -> Vec<crate::credentials::ResolvedAccount> {
    let dir = tempfile::tempdir().unwrap();
    let mut store = CredentialStore::load_or_default(&dir.path().join("creds.json")).unwrap();
    resolve(defs, &mut store, global).unwrap()
}

/// The poll stanza for one host, including its indented options.
fn stanza<'a>(fetchmailrc: &'a str, host: &str) -> &'a str {
    let start = fetchmailrc
        .find(&format!("poll {host}"))
        .unwrap_or_else(|| panic!("no stanza for {host}"));
    let rest = &fetchmailrc[start..];
    match rest.find("\n\n") {
        Some(end) => &rest[..end],
        None => rest.trim_end(),
    }
}

#[test]
fn renders_a_stanza_and_a_user_per_account() {
    let global = GlobalConfig::default();
    let set = render(&resolved(alice_and_bob(), &global), &global).unwrap();

    assert!(set.fetchmailrc.contains("poll imap.example.com protocol IMAP port 993"));
    assert!(set.fetchmailrc.contains("poll pop.example.org protocol POP3 port 995"));
    assert!(set.fetchmailrc.contains("is \"alice\" here"));
    assert!(set.fetchmailrc.contains("is \"bob\" here"));

    let users: Vec<&str> = set.dovecot_users.lines().collect();
    assert_eq!(users.len(), 2);
    assert!(users[0].starts_with("alice:{PBKDF2}$1$"));
    assert!(users[1].starts_with("bob:{PBKDF2}$1$"));

    // Distinct secrets must produce distinct hashes.
    let hash = |line: &str| line.split(':').nth(1).unwrap().to_string();
    assert_ne!(hash(users[0]), hash(users[1]));
}

#[test]
fn rendering_is_idempotent() {
    let global = GlobalConfig::default();
    let accounts = resolved(alice_and_bob(), &global);
    let first = render(&accounts, &global).unwrap();
    let second = render(&accounts, &global).unwrap();
    assert_eq!(first, second);
}

#[test]
fn both_targets_reference_the_same_identities() {
    let global = GlobalConfig::default();
    let set = render(&resolved(alice_and_bob(), &global), &global).unwrap();

    let mut from_fetchmail: Vec<String> = set
        .fetchmailrc
        .lines()
        .filter_map(|l| {
            let (_, rest) = l.split_once(" is \"")?;
            Some(rest.split('"').next().unwrap().to_string())
        })
        .collect();
    let mut from_users: Vec<String> = set
        .dovecot_users
        .lines()
        .map(|l| l.split(':').next().unwrap().to_string())
        .collect();

    from_fetchmail.sort();
    from_users.sort();
    assert_eq!(from_fetchmail, from_users);
    assert_eq!(from_users, vec!["alice", "bob"]);
}

#[test]
fn stanzas_follow_identifier_lexical_order() {
    let global = GlobalConfig::default();
    let defs = vec![
        definition("zoe", "imap", "imap.zoe.example", 993),
        definition("ada", "imap", "imap.ada.example", 993),
    ];
    let set = render(&resolved(defs, &global), &global).unwrap();

    let ada = set.fetchmailrc.find("poll imap.ada.example").unwrap();
    let zoe = set.fetchmailrc.find("poll imap.zoe.example").unwrap();
    assert!(ada < zoe);

    let users: Vec<&str> = set.dovecot_users.lines().collect();
    assert!(users[0].starts_with("ada:"));
    assert!(users[1].starts_with("zoe:"));
}

#[test]
fn changing_one_account_leaves_other_stanzas_byte_identical() {
    let global = GlobalConfig::default();

    let dir = tempfile::tempdir().unwrap();
    let mut store = CredentialStore::load_or_default(&dir.path().join("creds.json")).unwrap();

    let before = resolve(alice_and_bob(), &mut store, &global).unwrap();
    let before_set = render(&before, &global).unwrap();

    let mut defs = alice_and_bob();
    defs[1].document.fetch.poll_interval = Some(900);
    let after = resolve(defs, &mut store, &global).unwrap();
    let after_set = render(&after, &global).unwrap();

    assert_eq!(
        stanza(&before_set.fetchmailrc, "imap.example.com"),
        stanza(&after_set.fetchmailrc, "imap.example.com"),
    );
    assert_ne!(
        stanza(&before_set.fetchmailrc, "pop.example.org"),
        stanza(&after_set.fetchmailrc, "pop.example.org"),
    );
    assert!(after_set.fetchmailrc.contains("port 995 interval 3"));

    // The users file is untouched by a polling change.
    assert_eq!(before_set.dovecot_users, after_set.dovecot_users);
}

#[test]
fn retention_and_folder_options_render_per_account() {
    let global = GlobalConfig::default();
    let mut defs = alice_and_bob();
    defs[0].document.fetch.keep_mail = Some(false);
    defs[0].document.fetch.folders = vec!["INBOX".into(), "Archive".into()];
    let set = render(&resolved(defs, &global), &global).unwrap();

    let alice = stanza(&set.fetchmailrc, "imap.example.com");
    assert!(alice.contains("    no keep\n"));
    assert!(alice.contains("    folder \"INBOX\" \"Archive\""));

    // bob inherits the global keep default and, as pop3, gets no folder line.
    let bob = stanza(&set.fetchmailrc, "pop.example.org");
    assert!(bob.contains("    keep\n"));
    assert!(!bob.contains("folder"));
}

#[test]
fn hostile_fields_cannot_alter_adjacent_stanzas() {
    let global = GlobalConfig::default();

    // A quote-laden remote password is escaped, not interpolated raw.
    let mut defs = alice_and_bob();
    defs[0].document.source.password = "pa\"ss is \"root\" here".into();
    let set = render(&resolved(defs, &global), &global).unwrap();
    assert!(set
        .fetchmailrc
        .contains("password \"pa\\\"ss is \\\"root\\\" here\""));

    // A hostname that is not a plain token fails the render outright.
    let mut defs = alice_and_bob();
    defs[0].document.source.host = "example.com poll evil.example".into();
    let accounts = resolved(defs, &global);
    let err = render(&accounts, &global).unwrap_err();
    assert!(err.to_string().contains("not a plain hostname"));
}

#[test]
fn dovecot_conf_reflects_ssl_and_fts_settings() {
    let mut global = GlobalConfig::default();
    let set = render(&[], &global).unwrap();
    assert!(set.dovecot_conf.contains("ssl = no"));
    assert!(!set.dovecot_conf.contains("inet_listener imaps"));
    assert!(set.dovecot_conf.contains("fts = flatcurve"));
    assert!(set.dovecot_conf.contains("fts_index_path = /data/fts/%u"));

    global.dovecot.ssl_cert = "/certs/fullchain.pem".into();
    global.dovecot.ssl_key = "/certs/privkey.pem".into();
    global.dovecot.fts.enabled = false;
    let set = render(&[], &global).unwrap();
    assert!(set.dovecot_conf.contains("ssl = yes"));
    assert!(set.dovecot_conf.contains("ssl_cert = </certs/fullchain.pem"));
    assert!(set.dovecot_conf.contains("inet_listener imaps"));
    assert!(!set.dovecot_conf.contains("fts"));
}

#[test]
fn users_file_lines_carry_mailbox_paths_and_ownership() {
    let global = GlobalConfig::default();
    let set = render(
        &resolved(vec![definition("alice", "imap", "imap.example.com", 993)], &global),
        &global,
    )
    .unwrap();

    let line = set.dovecot_users.lines().next().unwrap();
    let fields: Vec<&str> = line.split(':').collect();
    assert_eq!(fields[0], "alice");
    assert_eq!(fields[2], "5000");
    assert_eq!(fields[3], "5000");
    assert!(line.contains(":/data/mail/alice:"));
    assert!(line.ends_with("userdb_mail=maildir:/data/mail/alice"));
}

#[test]
fn syslog_and_daemon_interval_render_from_global() {
    let mut global = GlobalConfig::default();
    global.fetchmail.syslog = true;
    global.fetchmail.poll_interval = 120;
    let set = render(&[], &global).unwrap();
    assert!(set.fetchmailrc.contains("set daemon 120\n"));
    assert!(set.fetchmailrc.contains("set syslog\n"));
}

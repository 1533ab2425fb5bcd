//! Projections into Dovecot's config grammar: the virtual-user passwd file
//! (one line per account, keyed by local identity) and the main server
//! config rendered from the global document.

use mailharbor_common::CycleError;

use crate::credentials::ResolvedAccount;
use crate::schema::GlobalConfig;

use super::escape::passwd_field;
use super::GENERATED_HEADER;

/// passwd-file: `user:password:uid:gid:gecos:home:shell:extra`.
pub(crate) fn render_users(
    accounts: &[ResolvedAccount],
    global: &GlobalConfig,
) -> Result<String, CycleError> {
    let dovecot = &global.dovecot;
    let mut out = String::new();

    for account in accounts {
        let id = account.id();
        let identity = account.local_identity();
        let home = account.mail_dir.to_string_lossy();

        out.push_str(&format!(
            "{}:{}:{}:{}::{}::userdb_mail=maildir:{}\n",
            passwd_field(&format!("account '{id}' local identity"), &identity)?,
            passwd_field(&format!("account '{id}' password hash"), &account.hash)?,
            dovecot.vmail_uid,
            dovecot.vmail_gid,
            passwd_field(&format!("account '{id}' mail directory"), &home)?,
            home,
        ));
    }

    Ok(out)
}

pub(crate) fn render_conf(global: &GlobalConfig) -> Result<String, CycleError> {
    let dovecot = &global.dovecot;
    let engine = &global.engine;
    let ssl_enabled = !dovecot.ssl_cert.is_empty() && !dovecot.ssl_key.is_empty();

    let mut out = String::new();
    out.push_str(GENERATED_HEADER);

    out.push_str("protocols = imap lmtp\nlisten = *\n\n");

    out.push_str(&format!(
        "mail_location = maildir:{}/%u\n",
        engine.mail_root.display()
    ));
    out.push_str(&format!("mail_uid = {}\n", dovecot.vmail_uid));
    out.push_str(&format!("mail_gid = {}\n", dovecot.vmail_gid));
    out.push_str(&format!("first_valid_uid = {}\n\n", dovecot.vmail_uid));

    out.push_str("service imap-login {\n");
    out.push_str(&format!(
        "  inet_listener imap {{\n    port = {}\n  }}\n",
        dovecot.imap_port
    ));
    if ssl_enabled {
        out.push_str(&format!(
            "  inet_listener imaps {{\n    port = {}\n    ssl = yes\n  }}\n",
            dovecot.imaps_port
        ));
    }
    out.push_str("}\n\n");

    out.push_str(&format!(
        "service lmtp {{\n  inet_listener lmtp {{\n    port = {}\n  }}\n}}\n\n",
        dovecot.lmtp_port
    ));

    if ssl_enabled {
        out.push_str(&format!(
            "ssl = yes\nssl_cert = <{}\nssl_key = <{}\n\n",
            dovecot.ssl_cert, dovecot.ssl_key
        ));
    } else {
        out.push_str("ssl = no\n\n");
    }

    let users = engine.dovecot_users.display();
    out.push_str(&format!(
        "passdb {{\n  driver = passwd-file\n  args = {users}\n}}\n\n"
    ));
    out.push_str(&format!(
        "userdb {{\n  driver = passwd-file\n  args = {users}\n}}\n"
    ));

    if dovecot.fts.enabled {
        out.push('\n');
        out.push_str("mail_plugins = $mail_plugins fts fts_flatcurve\n\n");
        out.push_str("plugin {\n  fts = flatcurve\n");
        if dovecot.fts.autoindex {
            out.push_str("  fts_autoindex = yes\n");
        }
        out.push_str(&format!(
            "  fts_index_path = {}/%u\n",
            engine.fts_root.display()
        ));
        out.push_str("}\n");
    }

    Ok(out)
}

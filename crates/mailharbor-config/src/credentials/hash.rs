//! One-way password hashing for local mailbox credentials.
//!
//! PBKDF2-HMAC-SHA256 with a fixed work factor, rendered in Dovecot's
//! scheme syntax: `{PBKDF2}$1$<salt-hex>$<rounds>$<hash-hex>`. The rounds
//! figure is recorded inside each hash, so it can be raised later without
//! invalidating entries derived under the old factor.

use hmac::Hmac;
use mailharbor_common::CycleError;
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Fixed work factor for newly derived hashes.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes.
const KEY_LEN: usize = 32;

/// Dovecot password-scheme prefix emitted into the users file.
pub const SCHEME: &str = "{PBKDF2}";

/// Derive a salted hash for `plain` with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, CycleError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hash_with_salt(plain, &salt, PBKDF2_ROUNDS)
}

/// Derive a hash under an explicit salt and work factor.
pub(crate) fn hash_with_salt(
    plain: &str,
    salt: &[u8],
    rounds: u32,
) -> Result<String, CycleError> {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2::<HmacSha256>(plain.as_bytes(), salt, rounds, &mut key)
        .map_err(|e| CycleError::Credential(format!("pbkdf2 derivation failed: {e}")))?;
    Ok(format!(
        "{SCHEME}$1${}${rounds}${}",
        hex(salt),
        hex(&key)
    ))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

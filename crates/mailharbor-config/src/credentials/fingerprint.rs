//! Plaintext change detection.
//!
//! FNV-1a over the plaintext, rendered as fixed-width hex. This is a
//! checksum for answering "did the operator change the secret", never a
//! security primitive; the secret itself only ever leaves memory as a
//! PBKDF2 hash.

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 16-hex-digit FNV-1a fingerprint of a plaintext credential.
pub fn fingerprint(plain: &str) -> String {
    let mut hash = FNV_OFFSET;
    for byte in plain.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}

//! One-way salted digests for password gating.
//!
//! The digest is SHA-512 over `"{value}|{salt}"`, rendered as base64. It is
//! deterministic: equal value and salt always produce the same output, so the
//! stored digest can be compared against a recomputed one at retrieval time.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha512};

/// Computes the salted digest of a value.
pub fn compute_hash(value: &str, salt: &str) -> String {
    let salted = format!("{value}|{salt}");
    let digest = Sha512::digest(salted.as_bytes());
    BASE64.encode(digest)
}

/// Recomputes the digest for `value` and `salt` and compares it against
/// `expected` in constant time.
pub fn verify_hash(value: &str, salt: &str, expected: &str) -> bool {
    constant_time_eq(compute_hash(value, salt).as_bytes(), expected.as_bytes())
}

/// Byte-wise comparison that does not short-circuit on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

//! Tamper-detection fingerprint for issued receipts.
//!
//! The hash binds a receipt's identity (both codes, the client document) to
//! its total, salted with an application-wide secret. It is computed once at
//! creation and recomputed on every verification; it never changes after
//! creation.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Stored hash length: 32 hex characters (128 bits of the SHA-256 digest).
pub const HASH_LEN: usize = 32;

/// Canonical amount rendering for hash input. Normalizing the scale means
/// `849.60` and `849.6` hash identically regardless of how the amount was
/// stored.
pub fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

/// SHA-256 over `receipt_code|verification_code|client_document|total` plus
/// the shared secret, hex-encoded and truncated. Deterministic.
pub fn compute_hash(
    receipt_code: &str,
    verification_code: &str,
    client_document: &str,
    total: Decimal,
    secret: &str,
) -> String {
    let payload = format!(
        "{}|{}|{}|{}",
        receipt_code,
        verification_code,
        client_document,
        format_amount(total)
    );
    let digest = Sha256::digest(format!("{}{}", payload, secret).as_bytes());
    hex::encode(digest)[..HASH_LEN].to_string()
}

/// Constant-time hash comparison.
pub fn hashes_match(expected: &str, stored: &str) -> bool {
    if expected.len() != stored.len() {
        return false;
    }
    expected.as_bytes().ct_eq(stored.as_bytes()).into()
}

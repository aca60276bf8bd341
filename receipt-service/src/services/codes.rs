//! Human-readable receipt and verification codes.
//!
//! Codes are usability handles, not secrets: forgery is prevented by the
//! integrity hash, not by code unpredictability. Uniqueness is probabilistic
//! (32^4 date-scoped receipt suffixes, 32^7 verification codes); the caller
//! treats a duplicate-key conflict at persistence time as retriable.

use crate::models::ServiceType;
use chrono::{Datelike, NaiveDate};
use rand::Rng;

/// Unambiguous alphabet: 0/O and 1/I excluded.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const RECEIPT_CODE_PREFIX: &str = "APU";
pub const VERIFICATION_CODE_PREFIX: &str = "VER";

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// `APU` + service-type letter + zero-padded month and day + 4 random
/// characters. 12 characters total.
pub fn generate_receipt_code(service_type: ServiceType, date: NaiveDate) -> String {
    format!(
        "{}{}{:02}{:02}{}",
        RECEIPT_CODE_PREFIX,
        service_type.code_letter(),
        date.month(),
        date.day(),
        random_suffix(4)
    )
}

/// `VER` + 7 random characters. 10 characters total. This is the value
/// shared with the verifying party.
pub fn generate_verification_code() -> String {
    format!("{}{}", VERIFICATION_CODE_PREFIX, random_suffix(7))
}

/// Normalize a user-supplied verification code: strip whitespace and
/// hyphens, uppercase.
pub fn normalize_verification_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase()
}

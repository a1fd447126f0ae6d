// src/correlation.rs
// Correlation ID generation and validation.
//
// A CorrelationID is a 16-character lowercase hexadecimal string drawn from
// a cryptographically secure random source (64 bits of entropy). It must
// survive truncation at word/URL-path boundaries and stay safe in headers,
// cookies, query arguments, DNS labels, and free-form bodies.

use rand::RngCore;
use regex::Regex;
use std::sync::LazyLock;

/// `^[0-9a-f]{16}$` — exactly 16 lowercase hex characters, no dashes, no
/// uppercase, no padding. Shared by both callback servers' extraction.
static CORRELATION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{16}$").expect("static pattern is valid"));

/// Generate a fresh correlation ID: 8 random bytes, hex-encoded.
pub fn generate() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// True iff `candidate` is exactly 16 lowercase hex characters.
pub fn is_valid(candidate: &str) -> bool {
    CORRELATION_ID_RE.is_match(candidate)
}

/// Extract the correlation ID from an arbitrary candidate string, returning
/// `None` if it does not match the strict format. Unlike `is_valid` this is
/// the entry point callback servers use: any candidate not matching is
/// rejected as unknown (but the caller still answers with the standard
/// response — see `callback::extract`).
pub fn validate(candidate: &str) -> Option<&str> {
    is_valid(candidate).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid() {
        for _ in 0..1000 {
            let id = generate();
            assert_eq!(id.len(), 16);
            assert!(is_valid(&id), "{id} should be valid");
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_valid("a1b2c3d4e5f6071")); // 15 chars
        assert!(!is_valid("a1b2c3d4e5f607180")); // 17 chars
    }

    #[test]
    fn rejects_uppercase() {
        assert!(!is_valid("A1B2C3D4E5F60718"));
    }

    #[test]
    fn rejects_non_hex() {
        assert!(!is_valid("zzzzzzzzzzzzzzzz"));
    }

    #[test]
    fn accepts_known_good_id() {
        assert!(is_valid("a1b2c3d4e5f60718"));
        assert!(is_valid("deadbeefcafef00d"));
    }
}

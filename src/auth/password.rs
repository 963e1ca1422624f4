//! One-way password hashing with bcrypt.
//!
//! Stored format is the standard `$2b$<cost>$<salt+digest>` string, so the
//! cost travels with each hash and verification never needs configuration.

use bcrypt::{hash, verify, BcryptError};

pub use bcrypt::DEFAULT_COST;

/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

pub fn hash_password(raw: &str, cost: u32) -> Result<String, BcryptError> {
    hash(raw, cost)
}

/// Malformed or foreign hashes never verify.
pub fn verify_password(raw: &str, stored: &str) -> bool {
    verify(raw, stored).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let stored = hash_password("1234", MIN_COST).unwrap();
        assert!(verify_password("1234", &stored));
        assert!(!verify_password("12345", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("1234", MIN_COST).unwrap();
        let b = hash_password("1234", MIN_COST).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("1234", &a));
        assert!(verify_password("1234", &b));
    }

    #[test]
    fn stored_hash_is_bcrypt_with_cost() {
        let stored = hash_password("hunter2-secret", MIN_COST).unwrap();
        assert!(!stored.contains("hunter2-secret"));
        assert!(stored.starts_with("$2b$04$"));
        assert_eq!(stored.len(), 60);
    }

    #[test]
    fn single_round_sha256_hashes_are_rejected() {
        // Old salted-digest format: salt$hex(sha256(salt + "$" + password))
        assert!(!verify_password(
            "1234",
            "sha256$0f1e2d3c4b5a69788796a5b4c3d2e1f0$03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        ));
    }

    #[test]
    fn malformed_hashes_do_not_verify() {
        assert!(!verify_password("1234", "1234"));
        assert!(!verify_password("1234", "$2b$04$short"));
        assert!(!verify_password("1234", ""));
    }

    #[test]
    fn out_of_range_cost_is_an_error() {
        assert!(hash_password("1234", MIN_COST - 1).is_err());
        assert!(hash_password("1234", MAX_COST + 1).is_err());
    }
}

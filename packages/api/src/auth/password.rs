//! # Password hashing and verification
//!
//! [`CredentialHasher`] produces salted, deliberately slow one-way hashes for new
//! passwords and checks plaintext against stored hashes:
//!
//! - **bcrypt** (default) with a configurable cost factor, 10 unless configured.
//!   Stored as the usual `$2b$<cost>$...` string.
//! - **Argon2id** with the `argon2` crate defaults, stored as a PHC string
//!   (`$argon2id$v=19$m=19456,t=2,p=1$...`).
//!
//! Verification detects the algorithm from the stored string, so switching the
//! configured algorithm keeps existing accounts working. Both backends compare
//! digests in constant time. A stored hash that cannot be parsed verifies as
//! `false`; it is never an error for the caller.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Deserialize;
use thiserror::Error;

pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hash function used for new passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    Bcrypt,
    Argon2id,
}

#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct PasswordError(String);

#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    algorithm: PasswordAlgorithm,
    bcrypt_cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(PasswordAlgorithm::Bcrypt, DEFAULT_BCRYPT_COST)
    }
}

impl CredentialHasher {
    pub fn new(algorithm: PasswordAlgorithm, bcrypt_cost: u32) -> Self {
        Self {
            algorithm,
            bcrypt_cost,
        }
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        match self.algorithm {
            PasswordAlgorithm::Bcrypt => {
                bcrypt::hash(password, self.bcrypt_cost).map_err(|e| PasswordError(e.to_string()))
            }
            PasswordAlgorithm::Argon2id => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| PasswordError(e.to_string()))
            }
        }
    }

    /// Check a plaintext password against a stored hash of either algorithm.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if hash.starts_with("$argon2") {
            match PasswordHash::new(hash) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(e) => {
                    tracing::warn!(error = %e, "stored argon2 hash is malformed");
                    false
                }
            }
        } else {
            bcrypt::verify(password, hash).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored bcrypt hash is malformed");
                false
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_hash_and_verify() {
        let hasher = CredentialHasher::new(PasswordAlgorithm::Bcrypt, MIN_BCRYPT_COST);

        let hash = hasher.hash("pw123").unwrap();
        assert!(hash.starts_with("$2b$04$"));
        assert_ne!(hash, "pw123");

        assert!(hasher.verify("pw123", &hash));
        assert!(!hasher.verify("pw124", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = CredentialHasher::new(PasswordAlgorithm::Bcrypt, MIN_BCRYPT_COST);
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_default_cost_is_ten() {
        let hasher = CredentialHasher::default();
        let hash = hasher.hash("pw").unwrap();
        assert!(hash.starts_with("$2b$10$"));
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hasher = CredentialHasher::new(PasswordAlgorithm::Argon2id, DEFAULT_BCRYPT_COST);

        let hash = hasher.hash("pw123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("pw123", &hash));
        assert!(!hasher.verify("wrong", &hash));
    }

    #[test]
    fn test_verify_detects_algorithm() {
        let bcrypt_hash = CredentialHasher::new(PasswordAlgorithm::Bcrypt, MIN_BCRYPT_COST)
            .hash("pw")
            .unwrap();
        let argon = CredentialHasher::new(PasswordAlgorithm::Argon2id, MIN_BCRYPT_COST);

        // An argon2-configured hasher still accepts bcrypt accounts
        assert!(argon.verify("pw", &bcrypt_hash));
    }

    #[test]
    fn test_malformed_hash_is_a_mismatch() {
        let hasher = CredentialHasher::default();
        assert!(!hasher.verify("pw", "not-a-hash"));
        assert!(!hasher.verify("pw", "$argon2id$garbage"));
        assert!(!hasher.verify("pw", ""));
    }
}

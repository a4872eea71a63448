//! # Authentication
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`password`] | bcrypt / Argon2id hashing and verification |
//! | [`token`] | HS256 bearer token issuance and verification |
//! | [`account`] | registration and login flows |
//! | [`guard`] | request-time bearer token check and the [`CurrentStudent`] extractor |

pub mod account;
pub mod guard;
pub mod password;
pub mod token;

pub use account::{login, register, Login, Registration};
pub use guard::{require_student, CurrentStudent};
pub use password::{
    CredentialHasher, PasswordAlgorithm, PasswordError, DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST,
    MIN_BCRYPT_COST,
};
pub use token::{Claims, TokenError, TokenService};

//! # Registration and login
//!
//! ## [`register`]
//!
//! Required fields, then the email pre-check (409), then hashing, then the insert.
//! A duplicate that slips past the pre-check is reported by the store and gets
//! the same 409. The token carries the new id, email and name.
//!
//! ## [`login`]
//!
//! An unknown email, a student without credentials and a wrong password all fail
//! with the same [`ApiError::InvalidCredentials`]. Logins without a stored hash are
//! checked against a decoy hash at the configured cost, so they take as long as a
//! wrong password. The token carries id and email.
//!
//! Hashing and verification are CPU-bound and run on the blocking pool.

use serde::Serialize;
use store::{RecordStore, Student};

use crate::auth::CredentialHasher;
use crate::error::{ApiError, ApiResult};
use crate::models::{LoginInput, LoginStudent, RegisterInput, StudentInfo};
use crate::state::{AppState, Store};

const DECOY_PASSWORD: &str = "decoy password for logins without a stored hash";

/// Data returned by a successful registration.
#[derive(Debug, Serialize)]
pub struct Registration {
    pub student: StudentInfo,
    pub token: String,
}

/// Data returned by a successful login.
#[derive(Debug, Serialize)]
pub struct Login {
    pub student: LoginStudent,
    pub token: String,
}

pub async fn register<S: Store>(
    state: &AppState<S>,
    input: RegisterInput,
) -> ApiResult<Registration> {
    let (mut new, password) = input.into_parts()?;

    let students = state.students();
    students.ensure_unique(&new.email).await?;

    new.password_hash = Some(hash_password(state.hasher, password).await?);
    let student = students.insert(new).await?;

    let token = state
        .tokens
        .issue(student.id, &student.email, Some(&student.name))
        .map_err(|e| ApiError::unexpected("error registering student", e))?;

    tracing::info!(student_id = student.id, "student registered");
    Ok(Registration {
        student: StudentInfo::from(&student),
        token,
    })
}

pub async fn login<S: Store>(state: &AppState<S>, input: LoginInput) -> ApiResult<Login> {
    let (email, password) = input.into_parts()?;

    let student = RecordStore::<Student>::find_by_unique(&state.store, &email)
        .await
        .map_err(|e| ApiError::unexpected("error logging in student", e))?;

    let stored = student.as_ref().and_then(|s| s.password_hash.clone());
    let has_hash = stored.is_some();
    let hash = match stored {
        Some(hash) => hash,
        None => decoy_hash(state).await?,
    };
    let matched = verify_password(state.hasher, password, hash).await?;

    let student = match student {
        Some(student) if has_hash && matched => student,
        Some(student) => {
            tracing::warn!(
                student_id = student.id,
                "login failed: wrong password or no credentials"
            );
            return Err(ApiError::InvalidCredentials);
        }
        None => {
            tracing::warn!("login failed: unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let token = state
        .tokens
        .issue(student.id, &student.email, None)
        .map_err(|e| ApiError::unexpected("error logging in student", e))?;

    tracing::info!(student_id = student.id, "student logged in");
    Ok(Login {
        student: LoginStudent::from(&student),
        token,
    })
}

/// The shared decoy hash, computed with the configured hasher on first use.
async fn decoy_hash<S>(state: &AppState<S>) -> ApiResult<String> {
    state
        .decoy_hash
        .get_or_try_init(|| hash_password(state.hasher, DECOY_PASSWORD.to_string()))
        .await
        .cloned()
}

async fn hash_password(hasher: CredentialHasher, password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::unexpected("password hashing task failed", e))?
        .map_err(|e| ApiError::unexpected("error registering student", e))
}

async fn verify_password(
    hasher: CredentialHasher,
    password: String,
    hash: String,
) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| ApiError::unexpected("password verification task failed", e))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use store::MemoryStore;

    use super::*;
    use crate::settings::Settings;

    fn state() -> AppState<MemoryStore> {
        let settings = Settings::from_toml(
            "[auth]\njwt_secret = \"account-secret-account-secret-1234\"\nbcrypt_cost = 4",
        )
        .unwrap();
        AppState::new(MemoryStore::new(), &settings)
    }

    fn amy() -> RegisterInput {
        RegisterInput {
            name: Some("Amy".to_string()),
            email: Some("a@x.com".to_string()),
            password: Some("pw123".to_string()),
            ..Default::default()
        }
    }

    fn credentials(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_issues_token() {
        let state = state();
        let registration = register(&state, amy()).await.unwrap();

        let claims = state.tokens.verify(&registration.token).unwrap();
        assert_eq!(claims.sub, registration.student.id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.name.as_deref(), Some("Amy"));

        let stored = RecordStore::<Student>::find_by_id(&state.store, claims.sub)
            .await
            .unwrap();
        let hash = stored.unwrap().password_hash.unwrap();
        assert_ne!(hash, "pw123");
        assert!(state.hasher.verify("pw123", &hash));
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let state = state();
        register(&state, amy()).await.unwrap();

        let mut again = amy();
        again.name = Some("Someone Else".to_string());
        again.password = Some("different".to_string());
        let err = register(&state, again).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let state = state();
        let registration = register(&state, amy()).await.unwrap();

        let login = login(&state, credentials("A@x.com", "pw123")).await.unwrap();
        assert_eq!(login.student.id, registration.student.id);
        assert_eq!(login.student.name, "Amy");
        assert_eq!(state.tokens.verify(&login.token).unwrap().name, None);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = state();
        register(&state, amy()).await.unwrap();

        let wrong = login(&state, credentials("a@x.com", "wrong")).await.unwrap_err();
        let unknown = login(&state, credentials("nobody@x.com", "pw123")).await.unwrap_err();

        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.status(), unknown.status());
        assert_eq!(wrong.to_string(), "invalid email or password");
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_unknown_email_still_checks_a_hash() {
        let state = state();
        assert!(!state.decoy_hash.initialized());

        let err = login(&state, credentials("nobody@x.com", "pw123"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        // The decoy is hashed with the configured algorithm and cost
        let decoy = state.decoy_hash.get().unwrap();
        assert!(decoy.starts_with("$2b$04$"));
        assert!(state.hasher.verify(DECOY_PASSWORD, decoy));
    }

    #[tokio::test]
    async fn test_student_without_credentials_cannot_log_in() {
        let state = state();
        state
            .students()
            .create(crate::models::StudentInput {
                name: Some("Bob".to_string()),
                email: Some("b@x.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        // Even the decoy password does not open an account without a hash
        let err = login(&state, credentials("b@x.com", DECOY_PASSWORD))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert!(state.decoy_hash.initialized());
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let state = state();
        let err = login(&state, LoginInput::default()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

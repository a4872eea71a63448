//! # API errors and their HTTP rendering
//!
//! Every failure a handler can produce is an [`ApiError`]. Rendering maps the
//! variant to a status code and a `{"success": false, "message": ...}` body:
//!
//! | Variant | Status | Raised when |
//! |---------|--------|-------------|
//! | `Validation` | 400 | required input missing or malformed |
//! | `InvalidCredentials` | 401 | login with unknown email or wrong password |
//! | `MissingToken` | 401 | protected route without a bearer token |
//! | `InvalidToken` | 403 | token expired, malformed or wrongly signed |
//! | `NotFound` | 404 | write to a missing id, or token subject gone |
//! | `Conflict` | 409 | unique field already taken, or row still referenced |
//! | `Unexpected` | 500 | store or infrastructure failure |
//!
//! `InvalidCredentials` carries no detail, so an unknown email and a wrong
//! password are indistinguishable to the caller. `Unexpected` keeps its source
//! for the server log; only the context message reaches the response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use store::StoreError;
use thiserror::Error;

use crate::auth::TokenError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("No token provided")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken(#[source] TokenError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{context}")]
    Unexpected {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn unexpected(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Unexpected {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::InvalidToken(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps store failures that reach a handler without a more specific translation.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { .. } => Self::Conflict(err.to_string()),
            StoreError::MissingReference { entity, id } => {
                Self::Validation(format!("{entity}Id {id} does not reference an existing {entity}"))
            }
            StoreError::StillReferenced { .. } => Self::Conflict(err.to_string()),
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::Io(_) | StoreError::Serialization(_) | StoreError::Backend(_) => {
                Self::unexpected("storage failure", err)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Unexpected { context, source } => {
                tracing::error!(error = %source, "{context}");
            }
            Self::InvalidToken(reason) => {
                tracing::warn!(%reason, "rejected bearer token");
            }
            _ => {}
        }

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidToken(TokenError::Expired).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::unexpected("x", "boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_reason_is_not_disclosed() {
        let expired = ApiError::InvalidToken(TokenError::Expired).to_string();
        let forged = ApiError::InvalidToken(TokenError::InvalidSignature).to_string();
        assert_eq!(expired, forged);
    }

    #[test]
    fn test_unexpected_hides_source() {
        let err = ApiError::unexpected("failed to fetch students", "connection refused to 10.0.0.3");
        assert_eq!(err.to_string(), "failed to fetch students");
    }

    #[test]
    fn test_store_error_mapping() {
        let conflict: ApiError = StoreError::UniqueViolation {
            entity: "note",
            field: "title",
        }
        .into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let missing: ApiError = StoreError::MissingReference {
            entity: "student",
            id: 9,
        }
        .into();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            missing.to_string(),
            "studentId 9 does not reference an existing student"
        );

        let referenced: ApiError = StoreError::StillReferenced {
            entity: "student",
            id: 3,
        }
        .into();
        assert_eq!(referenced.status(), StatusCode::CONFLICT);
        assert_eq!(referenced.to_string(), "student 3 is still referenced");

        let backend: ApiError = StoreError::Backend("pool timed out".into()).into();
        assert_eq!(backend.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

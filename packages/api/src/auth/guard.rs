//! # Auth guard
//!
//! [`require_student`] is installed with `axum::middleware::from_fn_with_state` on
//! every protected route. Per request it:
//!
//! 1. reads `Authorization: Bearer <token>`, otherwise 401 `No token provided`,
//! 2. verifies the token, otherwise 403 without saying why,
//! 3. resolves `sub` to a current student, otherwise 404
//!    `Invalid Token, student not found`,
//! 4. stores the [`StudentInfo`] in the request extensions for [`CurrentStudent`].
//!
//! Nothing is cached between requests. A deleted student's tokens stop working at
//! step 3; every other token works until it expires.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use store::{RecordStore, Student};

use crate::auth::TokenService;
use crate::error::{ApiError, ApiResult};
use crate::models::StudentInfo;
use crate::state::{AppState, Store};

pub async fn require_student<S: Store>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(req.headers()).ok_or(ApiError::MissingToken)?;
    let student = authenticate(&state.store, &state.tokens, token).await?;

    req.extensions_mut().insert(CurrentStudent(student));
    Ok(next.run(req).await)
}

/// Verify a token and resolve its subject to the current student row.
pub async fn authenticate<S: RecordStore<Student>>(
    store: &S,
    tokens: &TokenService,
    token: &str,
) -> ApiResult<StudentInfo> {
    let claims = tokens.verify(token).map_err(ApiError::InvalidToken)?;

    let student = store
        .find_by_id(claims.sub)
        .await
        .map_err(|e| ApiError::unexpected("failed to resolve token subject", e))?;

    match student {
        Some(student) => Ok(StudentInfo::from(&student)),
        None => {
            tracing::warn!(student_id = claims.sub, "token subject no longer exists");
            Err(ApiError::not_found("Invalid Token, student not found"))
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The student resolved by [`require_student`].
#[derive(Debug, Clone)]
pub struct CurrentStudent(pub StudentInfo);

impl std::ops::Deref for CurrentStudent {
    type Target = StudentInfo;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentStudent
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentStudent>()
            .cloned()
            .ok_or(ApiError::MissingToken)
    }
}

//! `/api/auth` handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::{guarded, Envelope, JsonBody};
use crate::auth::{self, CurrentStudent, Login, Registration};
use crate::error::ApiResult;
use crate::models::{LoginInput, RegisterInput, StudentInfo};
use crate::state::{AppState, Store};

pub(super) fn routes<S: Store>(state: &AppState<S>) -> Router<AppState<S>> {
    Router::new()
        .route("/auth/register", post(register::<S>))
        .route("/auth/login", post(login::<S>))
        .route("/auth/me", guarded(state, get(me), true))
}

async fn register<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> ApiResult<(StatusCode, Json<Envelope<Registration>>)> {
    let registration = auth::register(&state, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("User registered successfully", registration)),
    ))
}

async fn login<S: Store>(
    State(state): State<AppState<S>>,
    JsonBody(input): JsonBody<LoginInput>,
) -> ApiResult<Json<Envelope<Login>>> {
    let login = auth::login(&state, input).await?;
    Ok(Json(Envelope::new("Login successful", login)))
}

async fn me(CurrentStudent(student): CurrentStudent) -> Json<StudentInfo> {
    Json(student)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::routes::router;
    use crate::routes::test_support::{register, send, state};

    #[tokio::test]
    async fn test_register_then_wrong_password() {
        let app = router(state(""));

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"name": "Amy", "email": "a@x.com", "password": "pw123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["student"]["email"], "a@x.com");
        assert!(body["data"]["student"].get("password").is_none());
        assert!(body["data"]["student"].get("passwordHash").is_none());
        assert!(!body["data"]["token"].as_str().unwrap().is_empty());

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "message": "invalid email or password"}));

        let (status, unknown) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "nobody@x.com", "password": "pw123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown, body);
    }

    #[tokio::test]
    async fn test_login_returns_minimal_student() {
        let app = router(state(""));
        let (id, _) = register(&app, "Amy", "a@x.com").await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "a@x.com", "password": "pw123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(
            body["data"]["student"],
            json!({"id": id, "email": "a@x.com", "name": "Amy"})
        );

        let token = body["data"]["token"].as_str().unwrap();
        let (status, me) = send(&app, "GET", "/api/auth/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], id);
    }

    #[tokio::test]
    async fn test_register_validation_and_conflict() {
        let app = router(state(""));

        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"name": "Amy", "email": "a@x.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "missing required fields: password");

        register(&app, "Amy", "a@x.com").await;
        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"name": "Other", "email": "a@x.com", "password": "other", "age": 30})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_validation_error() {
        let app = router(state(""));
        let (status, body) = send(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"name": 12, "email": "a@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_me_rejects_expired_token() {
        let state = state("");
        let app = router(state.clone());
        let (id, _) = register(&app, "Amy", "a@x.com").await;

        let issued = Utc::now() - Duration::hours(24) - Duration::seconds(1);
        let stale = state
            .tokens
            .issue_at(id as i32, "a@x.com", None, issued)
            .unwrap();

        let (status, body) = send(&app, "GET", "/api/auth/me", Some(&stale), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "invalid or expired token");

        let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

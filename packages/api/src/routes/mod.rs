//! # HTTP routes
//!
//! Everything is mounted under `/api`:
//!
//! | Method | Path | Guarded |
//! |--------|------|---------|
//! | POST | `/auth/register` | no |
//! | POST | `/auth/login` | no |
//! | GET | `/auth/me` | yes |
//! | GET, POST | `/students` | when `access.students = "guarded"` |
//! | GET | `/students/{id}` | when `access.students = "guarded"` |
//! | PUT, DELETE | `/students/{id}` | yes |
//! | GET, POST | `/notes` | when `access.notes = "guarded"` |
//! | GET | `/notes/{id}` | when `access.notes = "guarded"` |
//! | PUT, DELETE | `/notes/{id}` | yes |
//!
//! Reads return the bare record or list (`null` for a missing id). Writes return
//! `{"success": true, "message": ..., "data": ...}`. Errors are rendered by
//! [`ApiError`].

mod auth;
mod notes;
mod students;

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::middleware;
use axum::routing::MethodRouter;
use axum::Router;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_student;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, Store};

/// Build the application router over any store.
pub fn router<S: Store>(state: AppState<S>) -> Router {
    let api = Router::new()
        .merge(auth::routes(&state))
        .merge(students::routes(&state))
        .merge(notes::routes(&state));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Put `route` behind the auth guard when `enabled`.
fn guarded<S: Store>(
    state: &AppState<S>,
    route: MethodRouter<AppState<S>>,
    enabled: bool,
) -> MethodRouter<AppState<S>> {
    if enabled {
        route.route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_student::<S>,
        ))
    } else {
        route
    }
}

/// `axum::Json` with rejections rendered as [`ApiError::Validation`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

/// Body of every successful write.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

fn parse_id(raw: &str) -> ApiResult<i32> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::validation(format!("invalid id: {raw}")))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use store::MemoryStore;
    use tower::ServiceExt;

    use crate::settings::Settings;
    use crate::state::AppState;

    pub const SECRET: &str = "routes-secret-routes-secret-routes-secret";

    pub fn state(access: &str) -> AppState<MemoryStore> {
        let settings = Settings::from_toml(&format!(
            "[auth]\njwt_secret = \"{SECRET}\"\nbcrypt_cost = 4\n{access}"
        ))
        .unwrap();
        AppState::new(MemoryStore::new(), &settings)
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Register a student and return `(id, token)`.
    pub async fn register(app: &Router, name: &str, email: &str) -> (i64, String) {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({"name": name, "email": email, "password": "pw123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["data"]["student"]["id"].as_i64().unwrap();
        let token = body["data"]["token"].as_str().unwrap().to_string();
        (id, token)
    }
}

//! # API crate — students and notes over HTTP
//!
//! Everything between the socket and the record store: configuration, the error
//! taxonomy, credentials, bearer tokens, the validated record service and the
//! axum router. The store itself is any [`store::RecordStore`] for both record
//! types; the binary picks PostgreSQL, memory or a JSON file at startup.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | — | password hashing, tokens, registration / login, the auth guard |
//! | [`db`] | `postgres` | connection pool and the PostgreSQL [`db::PgStore`] |
//! | [`error`] | — | [`ApiError`] and its JSON rendering |
//! | [`models`] | — | request payloads and client-safe student projections |
//! | [`routes`] | — | the `/api` router |
//! | [`service`] | — | create / update / delete pipeline shared by students and notes |
//! | [`settings`] | — | layered configuration |
//! | [`state`] | — | [`AppState`], cloned into every handler |

pub mod auth;
#[cfg(feature = "postgres")]
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod settings;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use models::{LoginStudent, StudentInfo};
pub use routes::router;
pub use settings::Settings;
pub use state::{AppState, Store};

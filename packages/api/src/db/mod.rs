//! # Database module — PostgreSQL pool and record store
//!
//! Gated behind the `postgres` feature so the in-process stores can be used
//! without pulling in SQLx.
//!
//! - [`connect`] opens a pool from the `[database]` settings.
//! - [`PgStore`] implements [`store::RecordStore`] for students and notes over
//!   that pool. The schema lives in `packages/api/migrations`.

mod pool;
mod postgres;

pub use pool::connect;
pub use postgres::PgStore;

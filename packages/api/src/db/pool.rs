//! Database connection pool.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::settings::Database;

/// Open a connection pool sized by `database.max_connections`.
pub async fn connect(database: &Database) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .connect(&database.url())
        .await?;

    tracing::info!(
        max_connections = database.max_connections,
        "database pool ready"
    );
    Ok(pool)
}

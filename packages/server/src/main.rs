use anyhow::Context;
use api::settings::Backend;
use api::{AppState, Settings, Store};
use store::{FileStore, MemoryStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new().context("failed to load settings")?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log.filter).context("invalid log.filter")?,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if settings.has_weak_secret() {
        tracing::warn!("auth.jwt_secret is shorter than 32 bytes");
    }

    match settings.storage.backend {
        Backend::Postgres => {
            let pool = api::db::connect(&settings.database)
                .await
                .context("failed to connect to database")?;

            sqlx::migrate!("../api/migrations")
                .run(&pool)
                .await
                .context("failed to run migrations")?;

            serve(api::db::PgStore::new(pool), &settings).await
        }
        Backend::Memory => {
            tracing::warn!("using the in-memory store, records are lost on exit");
            serve(MemoryStore::new(), &settings).await
        }
        Backend::File => {
            let store = FileStore::open(&settings.storage.file_path)
                .await
                .with_context(|| {
                    format!(
                        "failed to open store file {}",
                        settings.storage.file_path.display()
                    )
                })?;
            serve(store, &settings).await
        }
    }
}

async fn serve<S: Store>(store: S, settings: &Settings) -> anyhow::Result<()> {
    let router = api::router(AppState::new(store, settings));

    let addr = settings.server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

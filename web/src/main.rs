//! Confplan server binary.
//!
//! Loads configuration from the environment, connects to `PostgreSQL`,
//! ensures the schema exists and serves the API.

use anyhow::Context;
use confplan_postgres::PostgresScheduleStore;
use confplan_web::{AppState, Config, build_router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout))
        .connect(&config.database.url)
        .await
        .context("failed to connect to PostgreSQL")?;

    let store = PostgresScheduleStore::from_pool(pool);
    store.migrate().await.context("schema migration failed")?;

    let state = AppState::new(Arc::new(store));
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "confplan listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

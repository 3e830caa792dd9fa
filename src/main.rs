mod config;
mod db;
mod error;
mod manager;
mod schedule;
mod store;
mod task;
mod tasks;

use anyhow::Result;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::db::SqliteTaskStore;
use crate::manager::TaskManager;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("upkeep=info,tower_http=info")),
        )
        .init();

    let settings = Settings::load();
    config::init_timezone(&settings.timezone);

    let pool = db::init_db(&settings.database_url).await?;
    tracing::info!(database_url = %settings.database_url, timezone = %config::get_timezone(), "database initialized");

    let manager = TaskManager::new(SqliteTaskStore::new(pool));

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(tasks::router())
        .with_state(manager)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

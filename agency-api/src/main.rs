//! agency-api - JSON backend for the talent agency management application
//!
//! Owns sequential document numbering, the document lifecycle, finance
//! analytics and partner press-kit tracking over a shared SQLite database.

use agency_api::{build_router, AppState};
use agency_common::config;
use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting agency-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    // Root folder resolution: CLI arg > env var > config file > OS default
    let cli_root = std::env::args().nth(1);
    let root_folder = config::resolve_root_folder(cli_root.as_deref());
    let db_path = config::database_path(&root_folder);
    info!("Database path: {}", db_path.display());

    let pool = agency_common::db::init_database(&db_path).await?;
    info!("Database ready");

    let state = AppState::new(pool);
    let app = build_router(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    let port = config::resolve_port();
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("agency-api listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}

//! # Storefront API Server
//!
//! The HTTP server for the multi-vendor storefront backend. Each vendor
//! is an isolated tenant: its products, customers, staff, and orders are
//! invisible to other vendors.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/storefront \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p storefront-api
//! ```

use storefront_api::{app, config::Config};
use storefront_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Storefront API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database pool
    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    // Run pending migrations
    run_migrations(&pool).await?;

    // Build the application
    let state = app::AppState::new(pool, config.clone());
    let router = app::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", config.bind_address());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}

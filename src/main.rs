use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harbor_db::config::Config;
use harbor_db::database::Database;

/// Connectivity probe: build the pool, run the liveness query, close the
/// pool, and exit non-zero when the database is unreachable.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Probing PostgreSQL at {}:{}",
        config.postgres_host, config.postgres_port
    );

    // Initialize database pool
    let db = Database::connect(&config)
        .await
        .context("Failed to create database pool")?;

    let healthy = db.test_connection().await;

    // Graceful shutdown before reporting the probe result
    db.shutdown().await;

    if !healthy {
        std::process::exit(1);
    }

    Ok(())
}

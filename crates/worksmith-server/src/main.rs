//! Worksmith Server — application entry point.
//!
//! Connects to SurrealDB, applies migrations, and waits for shutdown.
//! The HTTP transport that consumes the core services is wired up by
//! the surrounding deployment; this binary owns observability and
//! storage bootstrap.

use tracing_subscriber::EnvFilter;
use worksmith_db::DbConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("worksmith=info".parse()?),
        )
        .json()
        .init();

    tracing::info!("Starting Worksmith server...");

    let config = DbConfig::from_env();
    let db = worksmith_db::connect(&config).await?;
    worksmith_db::run_migrations(&db).await?;
    tracing::info!("Database ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Worksmith server stopped.");
    Ok(())
}

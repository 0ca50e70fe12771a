//! SurrealDB connection bootstrap.

use std::env;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;

/// Connection settings, read from `WORKSMITH_DB_*` environment
/// variables with local-development defaults.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "worksmith".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Build the configuration from `WORKSMITH_DB_URL`, `_NS`, `_NAME`,
    /// `_USER` and `_PASS`, falling back to the defaults for anything
    /// unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env::var("WORKSMITH_DB_URL").unwrap_or(defaults.url),
            namespace: env::var("WORKSMITH_DB_NS").unwrap_or(defaults.namespace),
            database: env::var("WORKSMITH_DB_NAME").unwrap_or(defaults.database),
            username: env::var("WORKSMITH_DB_USER").unwrap_or(defaults.username),
            password: env::var("WORKSMITH_DB_PASS").unwrap_or(defaults.password),
        }
    }
}

/// Connect over WebSocket, authenticate as root, and select the
/// configured namespace and database.
pub async fn connect(config: &DbConfig) -> Result<Surreal<Client>, DbError> {
    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "connecting to SurrealDB"
    );

    let db = Surreal::new::<Ws>(&config.url).await?;
    db.signin(Root {
        username: &config.username,
        password: &config.password,
    })
    .await?;
    db.use_ns(&config.namespace).use_db(&config.database).await?;

    Ok(db)
}

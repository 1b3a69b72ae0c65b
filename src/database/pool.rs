use crate::database::config::{DatabaseConfig, redact_database_url};
use crate::error::{StoreError, StoreResult};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

/// SeaORM connection pool
///
/// The stored URL is redacted (password replaced) so it can
/// be logged.
#[derive(Clone)]
pub struct SeaOrmPool {
    conn: DatabaseConnection,
    redacted_url: String,
}

impl SeaOrmPool {
    /// Wrap an existing connection
    pub fn new(conn: DatabaseConnection, url: &str) -> Self {
        Self {
            conn,
            redacted_url: redact_database_url(url),
        }
    }

    /// Connect using pool settings from config
    pub async fn from_config(config: &DatabaseConfig) -> StoreResult<Self> {
        let mut opt = ConnectOptions::new(&config.url);
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await.map_err(|e| {
            StoreError::backend(format!(
                "Failed to connect to database {}: {}",
                config.redacted_url(),
                e
            ))
        })?;

        tracing::info!(
            url = %config.redacted_url(),
            max_connections = config.max_connections,
            "Database connected"
        );

        Ok(Self::new(conn, &config.url))
    }

    /// Get the inner SeaORM connection
    pub fn inner(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Connection URL with the password redacted
    pub fn connection_url(&self) -> &str {
        &self.redacted_url
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> StoreResult<()> {
        self.conn.ping().await.map_err(StoreError::from)
    }
}

//! # Database Handle
//!
//! Opens the SQLite pool the storefront runs on and hands out repositories.
//!
//! ```text
//! StorefrontConfig ──db_config()──► DbConfig { database_path, max_connections }
//!                                        │
//!                          Database::new │ WAL, foreign keys, migrations
//!                                        ▼
//!                               Database { SqlitePool }
//!                                        │
//!        ┌──────────────┬────────────────┼───────────────┬─────────────────────┐
//!        ▼              ▼                ▼               ▼                     ▼
//!     sellers()    products()     offer_codes()   checkout_forms()   offer_resolution()
//! ```
//!
//! Code resolution only reads, so concurrent checkouts share WAL snapshots.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::checkout_form::CheckoutFormRepository;
use crate::repository::offer_code::OfferCodeRepository;
use crate::repository::product::ProductRepository;
use crate::repository::seller::SellerRepository;
use crate::service::OfferResolutionService;

/// How long a checkout waits for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the pool lives and how wide it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
}

impl DbConfig {
    /// File-backed database with a pool of 5.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Private in-memory database on a single connection, so every query
    /// sees the same data.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
        }
    }
}

/// Shared handle to the storefront database. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening storefront database");

        // the URL form turns ":memory:" into a private in-memory database
        let url = format!("sqlite://{}", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // off by default in SQLite
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let db = Database { pool };
        db.run_migrations().await?;

        info!(max_connections = config.max_connections, "Storefront database ready");
        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn sellers(&self) -> SellerRepository {
        SellerRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn offer_codes(&self) -> OfferCodeRepository {
        OfferCodeRepository::new(self.pool.clone())
    }

    pub fn checkout_forms(&self) -> CheckoutFormRepository {
        CheckoutFormRepository::new(self.pool.clone())
    }

    /// Best-offer lookups for the purchase flow.
    ///
    /// ```rust,ignore
    /// let best = db.offer_resolution().best_offer_code("ebook", Some("SPRING"), None).await?;
    /// ```
    pub fn offer_resolution(&self) -> OfferResolutionService {
        OfferResolutionService::new(self.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// True while the pool can still run a query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_defaults() {
        let config = DbConfig::new("/tmp/storefront.db").max_connections(10);
        assert_eq!(config.database_path, PathBuf::from("/tmp/storefront.db"));
        assert_eq!(config.max_connections, 10);

        assert_eq!(DbConfig::in_memory().max_connections, 1);
    }
}

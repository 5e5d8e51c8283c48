//! Database layer
//!
//! This module handles local storage of:
//! - Hosts and their pool folder locks
//! - Rule documents per rule group
//! - Folder pools and seat counters
//! - The run log

pub mod host_repository;
pub mod log_repository;
pub mod memory;
pub mod pool_repository;
pub mod repository;
pub mod rule_repository;

pub use host_repository::SqliteHostRepository;
pub use log_repository::SqliteLogRepository;
pub use pool_repository::SqlitePoolRepository;
pub use repository::{HostRepository, LogRepository, PoolRepository, Repositories, RuleRepository};
pub use rule_repository::SqliteRuleRepository;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;
use crate::utils::{AppError, AppResult};

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> AppResult<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| AppError::Config(format!("Invalid database URL '{}': {}", config.url, e)))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Run pending migrations
pub async fn migrate(pool: &DbPool) -> AppResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

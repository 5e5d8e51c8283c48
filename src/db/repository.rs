//! Repository interfaces consumed by the sync service

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::memory::{MemoryHostRepository, MemoryLogRepository, MemoryPoolRepository, MemoryRuleRepository};
use crate::db::{
    DbPool, SqliteHostRepository, SqliteLogRepository, SqlitePoolRepository, SqliteRuleRepository,
};
use crate::models::{FolderPool, Host, LogEntry, RuleGroup, RuleRecord};
use crate::utils::AppResult;

/// Host records
#[async_trait]
pub trait HostRepository: Send + Sync {
    /// Fetch one host; `NotFound` when it does not exist
    async fn get(&self, hostname: &str) -> AppResult<Host>;

    /// All hosts ordered by hostname
    async fn list(&self) -> AppResult<Vec<Host>>;

    /// Insert or replace a host, keeping an existing folder lock unless the
    /// new record carries one
    async fn upsert(&self, host: &Host) -> AppResult<()>;

    /// Persist the host's pool folder lock
    async fn set_locked_folder(&self, hostname: &str, folder: Option<&str>) -> AppResult<()>;
}

/// Rule documents, one collection per rule group
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Enabled rules ordered by `sort_order`, ties in insertion order
    async fn list_enabled(&self, group: RuleGroup) -> AppResult<Vec<RuleRecord>>;

    /// Insert or replace a rule by name within its group
    async fn upsert(&self, group: RuleGroup, record: &RuleRecord) -> AppResult<()>;
}

/// Folder pools and their seat counters
#[async_trait]
pub trait PoolRepository: Send + Sync {
    /// All pools in allocation order
    async fn list(&self) -> AppResult<Vec<FolderPool>>;

    /// Insert or update a pool; new pools go to the end of the order
    ///
    /// Seats already taken are kept. A capacity below the seats taken is a
    /// validation error and leaves the stored pool unchanged.
    async fn upsert(&self, pool: &FolderPool) -> AppResult<()>;

    /// Add `delta` to the seats taken, clamped to `0..=seat_capacity`
    async fn adjust_seats(&self, folder_name: &str, delta: i64) -> AppResult<()>;
}

/// Run log
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn record(&self, entry: &LogEntry) -> AppResult<()>;

    /// Most recent entries first
    async fn recent(&self, limit: i64) -> AppResult<Vec<LogEntry>>;
}

/// All repositories the sync service works with
#[derive(Clone)]
pub struct Repositories {
    pub hosts: Arc<dyn HostRepository>,
    pub rules: Arc<dyn RuleRepository>,
    pub pools: Arc<dyn PoolRepository>,
    pub logs: Arc<dyn LogRepository>,
}

impl Repositories {
    /// SQLite-backed repositories sharing one connection pool
    pub fn sqlite(pool: DbPool) -> Self {
        Self {
            hosts: Arc::new(SqliteHostRepository::new(pool.clone())),
            rules: Arc::new(SqliteRuleRepository::new(pool.clone())),
            pools: Arc::new(SqlitePoolRepository::new(pool.clone())),
            logs: Arc::new(SqliteLogRepository::new(pool)),
        }
    }

    /// Repositories that keep everything in memory
    pub fn in_memory() -> Self {
        Self {
            hosts: Arc::new(MemoryHostRepository::default()),
            rules: Arc::new(MemoryRuleRepository::default()),
            pools: Arc::new(MemoryPoolRepository::default()),
            logs: Arc::new(MemoryLogRepository::default()),
        }
    }
}

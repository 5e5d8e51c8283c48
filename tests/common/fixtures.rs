//! Test fixtures for storage and service setup

use cmdb_syncer::config::{DatabaseConfig, ExportConfig};
use cmdb_syncer::db::{self, Repositories};
use cmdb_syncer::SyncService;

/// In-memory SQLite database with all migrations applied
///
/// A single connection that never idles out, so the database lives as long
/// as the pool.
pub fn memory_database() -> DatabaseConfig {
    DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout_secs: 5,
        idle_timeout_secs: 3600,
    }
}

pub async fn sqlite_repositories() -> Repositories {
    let pool = db::init_pool(&memory_database())
        .await
        .expect("Failed to initialize test database");
    Repositories::sqlite(pool)
}

/// Export settings with deterministic host order
pub fn sequential_export() -> ExportConfig {
    ExportConfig {
        concurrency: 1,
        record_runs: true,
    }
}

pub async fn sync_service(repos: Repositories) -> SyncService {
    SyncService::new(repos, &sequential_export())
        .await
        .expect("Failed to create sync service")
}

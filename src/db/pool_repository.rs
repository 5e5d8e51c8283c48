//! Folder pool repository

use async_trait::async_trait;

use crate::db::{DbPool, PoolRepository};
use crate::models::FolderPool;
use crate::utils::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct PoolRow {
    folder_name: String,
    seat_capacity: i64,
    seats_taken: i64,
    enabled: bool,
}

fn row_to_pool(row: PoolRow) -> FolderPool {
    FolderPool {
        folder_name: row.folder_name,
        seat_capacity: u32::try_from(row.seat_capacity).unwrap_or(0),
        seats_taken: u32::try_from(row.seats_taken).unwrap_or(0),
        enabled: row.enabled,
    }
}

/// Error for a capacity below the seats still held by locked hosts
pub(crate) fn shrink_error(folder_name: &str, seat_capacity: u32) -> AppError {
    AppError::Validation(format!(
        "Folder pool '{}' has more seats taken than the new capacity {}",
        folder_name, seat_capacity
    ))
}

pub struct SqlitePoolRepository {
    pool: DbPool,
}

impl SqlitePoolRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoolRepository for SqlitePoolRepository {
    async fn list(&self) -> AppResult<Vec<FolderPool>> {
        let rows = sqlx::query_as::<_, PoolRow>(
            r#"
            SELECT folder_name, seat_capacity, seats_taken, enabled
            FROM folder_pools
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_pool).collect())
    }

    async fn upsert(&self, pool: &FolderPool) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO folder_pools (folder_name, seat_capacity, seats_taken, enabled, position)
            VALUES (?, ?, ?, ?, (SELECT COALESCE(MAX(position), 0) + 1 FROM folder_pools))
            ON CONFLICT (folder_name) DO UPDATE SET
                seat_capacity = excluded.seat_capacity,
                seats_taken = MAX(excluded.seats_taken, folder_pools.seats_taken),
                enabled = excluded.enabled
            WHERE excluded.seat_capacity >= folder_pools.seats_taken
            "#,
        )
        .bind(&pool.folder_name)
        .bind(i64::from(pool.seat_capacity))
        .bind(i64::from(pool.seats_taken))
        .bind(pool.enabled)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(shrink_error(&pool.folder_name, pool.seat_capacity));
        }
        Ok(())
    }

    async fn adjust_seats(&self, folder_name: &str, delta: i64) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE folder_pools
            SET seats_taken = MAX(0, MIN(seat_capacity, seats_taken + ?))
            WHERE folder_name = ?
            "#,
        )
        .bind(delta)
        .bind(folder_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Folder pool '{}'", folder_name)));
        }
        Ok(())
    }
}

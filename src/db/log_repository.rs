//! Run log repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::{DbPool, LogRepository};
use crate::models::LogEntry;
use crate::utils::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    datetime: String,
    source: String,
    message: String,
    has_error: bool,
    details: String,
}

fn row_to_entry(row: LogRow) -> AppResult<LogEntry> {
    let datetime = DateTime::parse_from_rfc3339(&row.datetime)
        .map_err(|e| AppError::Serialization(format!("Invalid log timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(LogEntry {
        datetime,
        source: row.source,
        message: row.message,
        has_error: row.has_error,
        details: serde_json::from_str(&row.details)?,
    })
}

pub struct SqliteLogRepository {
    pool: DbPool,
}

impl SqliteLogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogRepository for SqliteLogRepository {
    async fn record(&self, entry: &LogEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO log_entries (datetime, source, message, has_error, details)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.datetime.to_rfc3339())
        .bind(&entry.source)
        .bind(&entry.message)
        .bind(entry.has_error)
        .bind(serde_json::to_string(&entry.details)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<LogEntry>> {
        let rows = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT datetime, source, message, has_error, details
            FROM log_entries
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_entry).collect()
    }
}

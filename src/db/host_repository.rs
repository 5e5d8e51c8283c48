//! Host repository

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;

use crate::db::{DbPool, HostRepository};
use crate::models::Host;
use crate::utils::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct HostRow {
    hostname: String,
    attributes: String,
    labels: String,
    locked_folder: Option<String>,
}

fn row_to_host(row: HostRow) -> AppResult<Host> {
    let attributes: BTreeMap<String, String> = serde_json::from_str(&row.attributes)?;
    let labels: BTreeMap<String, String> = serde_json::from_str(&row.labels)?;
    Ok(Host {
        hostname: row.hostname,
        attributes,
        labels,
        locked_folder: row.locked_folder,
    })
}

pub struct SqliteHostRepository {
    pool: DbPool,
}

impl SqliteHostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HostRepository for SqliteHostRepository {
    async fn get(&self, hostname: &str) -> AppResult<Host> {
        let row = sqlx::query_as::<_, HostRow>(
            r#"
            SELECT hostname, attributes, labels, locked_folder
            FROM hosts
            WHERE hostname = ?
            "#,
        )
        .bind(hostname)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Host '{}'", hostname)))?;

        row_to_host(row)
    }

    async fn list(&self) -> AppResult<Vec<Host>> {
        let rows = sqlx::query_as::<_, HostRow>(
            r#"
            SELECT hostname, attributes, labels, locked_folder
            FROM hosts
            ORDER BY hostname
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_host).collect()
    }

    async fn upsert(&self, host: &Host) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO hosts (hostname, attributes, labels, locked_folder, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (hostname) DO UPDATE SET
                attributes = excluded.attributes,
                labels = excluded.labels,
                locked_folder = COALESCE(excluded.locked_folder, hosts.locked_folder),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&host.hostname)
        .bind(serde_json::to_string(&host.attributes)?)
        .bind(serde_json::to_string(&host.labels)?)
        .bind(&host.locked_folder)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_locked_folder(&self, hostname: &str, folder: Option<&str>) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE hosts
            SET locked_folder = ?, updated_at = ?
            WHERE hostname = ?
            "#,
        )
        .bind(folder)
        .bind(Utc::now().to_rfc3339())
        .bind(hostname)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Host '{}'", hostname)));
        }
        Ok(())
    }
}

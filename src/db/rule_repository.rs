//! Rule repository

use async_trait::async_trait;
use chrono::Utc;

use crate::db::{DbPool, RuleRepository};
use crate::models::{RuleGroup, RuleRecord};
use crate::utils::AppResult;

#[derive(Debug, sqlx::FromRow)]
struct RuleRow {
    name: String,
    enabled: bool,
    sort_order: i64,
    document: String,
}

fn row_to_record(row: RuleRow) -> AppResult<RuleRecord> {
    Ok(RuleRecord {
        name: row.name,
        enabled: row.enabled,
        sort_order: row.sort_order,
        document: serde_json::from_str(&row.document)?,
    })
}

pub struct SqliteRuleRepository {
    pool: DbPool,
}

impl SqliteRuleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleRepository for SqliteRuleRepository {
    async fn list_enabled(&self, group: RuleGroup) -> AppResult<Vec<RuleRecord>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            r#"
            SELECT name, enabled, sort_order, document
            FROM rules
            WHERE rule_group = ? AND enabled = 1
            ORDER BY sort_order, id
            "#,
        )
        .bind(group.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn upsert(&self, group: RuleGroup, record: &RuleRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rules (rule_group, name, enabled, sort_order, document, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (rule_group, name) DO UPDATE SET
                enabled = excluded.enabled,
                sort_order = excluded.sort_order,
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(group.as_str())
        .bind(&record.name)
        .bind(record.enabled)
        .bind(record.sort_order)
        .bind(serde_json::to_string(&record.document)?)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

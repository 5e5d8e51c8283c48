//! In-memory repositories
//!
//! Same behavior as the SQLite repositories, without persistence. Used by
//! tests and when embedding the engine.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::pool_repository::shrink_error;
use crate::db::{HostRepository, LogRepository, PoolRepository, RuleRepository};
use crate::models::{FolderPool, Host, LogEntry, RuleGroup, RuleRecord};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default)]
pub struct MemoryHostRepository {
    hosts: RwLock<BTreeMap<String, Host>>,
}

#[async_trait]
impl HostRepository for MemoryHostRepository {
    async fn get(&self, hostname: &str) -> AppResult<Host> {
        self.hosts
            .read()
            .await
            .get(hostname)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Host '{}'", hostname)))
    }

    async fn list(&self) -> AppResult<Vec<Host>> {
        Ok(self.hosts.read().await.values().cloned().collect())
    }

    async fn upsert(&self, host: &Host) -> AppResult<()> {
        let mut hosts = self.hosts.write().await;
        let mut host = host.clone();
        if host.locked_folder.is_none() {
            host.locked_folder = hosts.get(&host.hostname).and_then(|h| h.locked_folder.clone());
        }
        hosts.insert(host.hostname.clone(), host);
        Ok(())
    }

    async fn set_locked_folder(&self, hostname: &str, folder: Option<&str>) -> AppResult<()> {
        let mut hosts = self.hosts.write().await;
        let host = hosts
            .get_mut(hostname)
            .ok_or_else(|| AppError::NotFound(format!("Host '{}'", hostname)))?;
        host.lock_to_folder(folder.map(str::to_string));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryRuleRepository {
    rules: RwLock<HashMap<RuleGroup, Vec<RuleRecord>>>,
}

#[async_trait]
impl RuleRepository for MemoryRuleRepository {
    async fn list_enabled(&self, group: RuleGroup) -> AppResult<Vec<RuleRecord>> {
        let rules = self.rules.read().await;
        let mut enabled: Vec<RuleRecord> = rules
            .get(&group)
            .map(|records| records.iter().filter(|r| r.enabled).cloned().collect())
            .unwrap_or_default();
        enabled.sort_by_key(|r| r.sort_order);
        Ok(enabled)
    }

    async fn upsert(&self, group: RuleGroup, record: &RuleRecord) -> AppResult<()> {
        let mut rules = self.rules.write().await;
        let records = rules.entry(group).or_default();
        match records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPoolRepository {
    pools: RwLock<Vec<FolderPool>>,
}

#[async_trait]
impl PoolRepository for MemoryPoolRepository {
    async fn list(&self) -> AppResult<Vec<FolderPool>> {
        Ok(self.pools.read().await.clone())
    }

    async fn upsert(&self, pool: &FolderPool) -> AppResult<()> {
        let mut pools = self.pools.write().await;
        match pools.iter_mut().find(|p| p.folder_name == pool.folder_name) {
            Some(existing) => {
                if pool.seat_capacity < existing.seats_taken {
                    return Err(shrink_error(&pool.folder_name, pool.seat_capacity));
                }
                let seats_taken = existing.seats_taken.max(pool.seats_taken);
                *existing = FolderPool {
                    seats_taken,
                    ..pool.clone()
                };
            }
            None => pools.push(pool.clone()),
        }
        Ok(())
    }

    async fn adjust_seats(&self, folder_name: &str, delta: i64) -> AppResult<()> {
        let mut pools = self.pools.write().await;
        let pool = pools
            .iter_mut()
            .find(|p| p.folder_name == folder_name)
            .ok_or_else(|| AppError::NotFound(format!("Folder pool '{}'", folder_name)))?;

        let seats = (i64::from(pool.seats_taken) + delta).clamp(0, i64::from(pool.seat_capacity));
        pool.seats_taken = u32::try_from(seats).unwrap_or(0);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryLogRepository {
    entries: RwLock<Vec<LogEntry>>,
}

#[async_trait]
impl LogRepository for MemoryLogRepository {
    async fn record(&self, entry: &LogEntry) -> AppResult<()> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn recent(&self, limit: i64) -> AppResult<Vec<LogEntry>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self.entries.read().await.iter().rev().take(limit).cloned().collect())
    }
}

//! Folder pool allocator
//!
//! Seat counters live behind one mutex so concurrent host evaluations never
//! hand out more seats than a pool has.

use tokio::sync::Mutex;

use crate::models::FolderPool;
use crate::services::checkmk::PoolDecision;
use crate::utils::{AppError, AppResult};

/// Side effects of committing a [`PoolDecision`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolCommit {
    /// Pool folder to render into the host's folder path
    pub folder: Option<String>,
    /// New lock for the host, when it changed (`Some(None)` clears it)
    pub lock_change: Option<Option<String>>,
    /// Pool whose seat count changed, with the delta
    pub seat_change: Option<(String, i64)>,
}

/// First-fit allocator over an ordered list of folder pools
#[derive(Debug, Default)]
pub struct FolderPoolAllocator {
    pools: Mutex<Vec<FolderPool>>,
}

impl FolderPoolAllocator {
    /// Create an allocator; pools are scanned in the given order
    pub fn new(pools: Vec<FolderPool>) -> Self {
        Self {
            pools: Mutex::new(pools),
        }
    }

    /// Take a seat in the first enabled pool with room
    ///
    /// With `candidates`, only the named pools are considered, still in pool
    /// order.
    pub async fn acquire(&self, hostname: &str, candidates: Option<&[String]>) -> AppResult<String> {
        let mut pools = self.pools.lock().await;
        let pool = pools
            .iter_mut()
            .filter(|p| p.enabled && p.has_free_seat())
            .find(|p| candidates.map_or(true, |names| names.iter().any(|n| *n == p.folder_name)))
            .ok_or_else(|| AppError::NoFolderAvailable(hostname.to_string()))?;

        pool.seats_taken += 1;
        tracing::debug!(
            "Host '{}' took seat {}/{} in pool '{}'",
            hostname,
            pool.seats_taken,
            pool.seat_capacity,
            pool.folder_name
        );
        Ok(pool.folder_name.clone())
    }

    /// Give a seat back; returns false when nothing was released
    pub async fn release(&self, folder_name: &str) -> bool {
        let mut pools = self.pools.lock().await;
        match pools.iter_mut().find(|p| p.folder_name == folder_name) {
            Some(pool) if pool.seats_taken > 0 => {
                pool.seats_taken -= 1;
                true
            }
            Some(_) => false,
            None => {
                tracing::debug!("Release of unknown pool '{}' ignored", folder_name);
                false
            }
        }
    }

    /// Apply the pool transition decided for one host
    pub async fn commit(&self, hostname: &str, decision: &PoolDecision) -> AppResult<PoolCommit> {
        match decision {
            PoolDecision::Unchanged => Ok(PoolCommit::default()),
            PoolDecision::Keep(folder) => Ok(PoolCommit {
                folder: Some(folder.clone()),
                ..Default::default()
            }),
            PoolDecision::Acquire(candidates) => {
                let folder = self.acquire(hostname, candidates.as_deref()).await?;
                Ok(PoolCommit {
                    folder: Some(folder.clone()),
                    lock_change: Some(Some(folder.clone())),
                    seat_change: Some((folder, 1)),
                })
            }
            PoolDecision::Release(folder) => {
                let released = self.release(folder).await;
                tracing::info!("Host '{}' released pool folder '{}'", hostname, folder);
                Ok(PoolCommit {
                    folder: None,
                    lock_change: Some(None),
                    seat_change: released.then(|| (folder.clone(), -1)),
                })
            }
        }
    }

    /// Swap in a fresh pool list, e.g. after an import
    pub async fn replace(&self, pools: Vec<FolderPool>) {
        *self.pools.lock().await = pools;
    }

    /// Current state of all pools
    pub async fn snapshot(&self) -> Vec<FolderPool> {
        self.pools.lock().await.clone()
    }

    pub async fn get(&self, folder_name: &str) -> Option<FolderPool> {
        self.pools
            .lock()
            .await
            .iter()
            .find(|p| p.folder_name == folder_name)
            .cloned()
    }
}

//! Netbox attributes, folder pool occupancy and the run log

use async_trait::async_trait;
use serde::Serialize;

use super::{hostname_arg, to_json, Command};
use crate::models::{FolderPool, PoolState};
use crate::AppState;

const DEFAULT_RUN_LIMIT: i64 = 20;

pub struct NetboxCommand;

#[async_trait]
impl Command for NetboxCommand {
    fn name(&self) -> &'static str {
        "netbox"
    }

    fn usage(&self) -> &'static str {
        "<hostname>"
    }

    fn about(&self) -> &'static str {
        "Show the attributes a host exposes to Netbox"
    }

    async fn run(&self, state: &AppState, args: &[String]) -> anyhow::Result<String> {
        let hostname = hostname_arg(args, self.usage())?;
        to_json(&state.sync.netbox_attributes(hostname).await?)
    }
}

#[derive(Debug, Serialize)]
struct PoolStatus {
    #[serde(flatten)]
    pool: FolderPool,
    state: PoolState,
    seats_free: u32,
}

impl From<FolderPool> for PoolStatus {
    fn from(pool: FolderPool) -> Self {
        Self {
            state: pool.state(),
            seats_free: pool.seat_capacity.saturating_sub(pool.seats_taken),
            pool,
        }
    }
}

pub struct PoolsCommand;

#[async_trait]
impl Command for PoolsCommand {
    fn name(&self) -> &'static str {
        "pools"
    }

    fn usage(&self) -> &'static str {
        ""
    }

    fn about(&self) -> &'static str {
        "Show folder pools and their seats"
    }

    async fn run(&self, state: &AppState, _args: &[String]) -> anyhow::Result<String> {
        let pools: Vec<PoolStatus> = state
            .sync
            .folder_pools()
            .await
            .into_iter()
            .map(PoolStatus::from)
            .collect();
        to_json(&pools)
    }
}

pub struct RunsCommand;

#[async_trait]
impl Command for RunsCommand {
    fn name(&self) -> &'static str {
        "runs"
    }

    fn usage(&self) -> &'static str {
        "[limit]"
    }

    fn about(&self) -> &'static str {
        "Show the most recent batch runs"
    }

    async fn run(&self, state: &AppState, args: &[String]) -> anyhow::Result<String> {
        let limit = match args.first() {
            Some(limit) => limit
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("Invalid limit '{}'", limit))?,
            None => DEFAULT_RUN_LIMIT,
        };
        to_json(&state.sync.recent_runs(limit).await?)
    }
}

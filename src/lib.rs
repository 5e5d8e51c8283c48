//! CMDB Syncer rule engine
//!
//! Decides per host which attributes are exported, which Checkmk folder,
//! groups and rulesets a host ends up in, and which variables it gets in the
//! Ansible inventory. Rules are stored per rule group and evaluated in
//! `sort_order`; folder pools hand out capacity-bounded folders.

use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

pub use commands::{Command, CommandRegistry};
pub use config::AppConfig;
pub use db::{DbPool, Repositories};
pub use services::SyncService;
pub use utils::{AppError, AppResult};

/// Application state shared across commands
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Rule evaluation and export
    pub sync: Arc<SyncService>,
}

impl AppState {
    pub fn new(config: AppConfig, sync: SyncService) -> Self {
        Self {
            config,
            sync: Arc::new(sync),
        }
    }

    /// Open the configured database and load the folder pools
    pub async fn connect(config: AppConfig) -> AppResult<Self> {
        let pool = db::init_pool(&config.database).await?;
        let sync = SyncService::new(Repositories::sqlite(pool), &config.export).await?;
        Ok(Self::new(config, sync))
    }
}

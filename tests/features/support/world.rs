//! Test world for Cucumber scenarios

use std::fmt;

use cucumber::World;

use cmdb_syncer::config::ExportConfig;
use cmdb_syncer::db::Repositories;
use cmdb_syncer::models::{CheckmkAction, FilterAction, Host, Rule, RuleGroup, RuleRecord};
use cmdb_syncer::services::ExportSummary;
use cmdb_syncer::SyncService;

/// Test world that maintains state across scenario steps
///
/// Rules are staged in the world and written to storage right before an
/// export, so later steps can still change a rule's order or flags.
#[derive(World)]
#[world(init = Self::new)]
pub struct TestWorld {
    /// In-memory storage shared by every export of the scenario
    pub repos: Repositories,

    /// Checkmk rules by name, in definition order
    pub checkmk_rules: Vec<Rule<CheckmkAction>>,

    /// Checkmk filter rules
    pub filter_rules: Vec<Rule<FilterAction>>,

    /// Result of the last export
    pub last_export: Option<ExportSummary>,
}

impl fmt::Debug for TestWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestWorld")
            .field("checkmk_rules", &self.checkmk_rules)
            .field("filter_rules", &self.filter_rules)
            .field("last_export", &self.last_export)
            .finish()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            repos: Repositories::in_memory(),
            checkmk_rules: vec![],
            filter_rules: vec![],
            last_export: None,
        }
    }

    pub async fn add_host(&mut self, host: Host) {
        self.repos.hosts.upsert(&host).await.expect("Failed to store host");
    }

    pub fn checkmk_rule_mut(&mut self, name: &str) -> &mut Rule<CheckmkAction> {
        self.checkmk_rules
            .iter_mut()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("No checkmk rule named {}", name))
    }

    /// Write the staged rules and run a batch export with a fresh service
    pub async fn export(&mut self) {
        for rule in &self.checkmk_rules {
            let record = RuleRecord::encode(rule).expect("Failed to encode rule");
            self.repos.rules.upsert(RuleGroup::CheckmkRules, &record).await.unwrap();
        }
        for rule in &self.filter_rules {
            let record = RuleRecord::encode(rule).expect("Failed to encode rule");
            self.repos.rules.upsert(RuleGroup::CheckmkFilter, &record).await.unwrap();
        }

        let export = ExportConfig {
            concurrency: 1,
            record_runs: true,
        };
        let sync = SyncService::new(self.repos.clone(), &export)
            .await
            .expect("Failed to create sync service");
        self.last_export = Some(sync.export_checkmk().await.expect("Export failed"));
    }

    pub fn last_export(&self) -> &ExportSummary {
        self.last_export.as_ref().expect("No export has run")
    }
}

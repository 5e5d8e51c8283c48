//! Sync service
//!
//! Loads rules and hosts from the repositories, runs them through the rule
//! engine and commits folder pool decisions. Rule sets are read and compiled
//! once per call.

use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ExportConfig;
use crate::db::Repositories;
use crate::models::{
    CheckmkAction, CheckmkOutcome, CustomVariableAction, Evaluation, FilterAction, FilterOutcome, FolderPool,
    GroupAction, GroupOutcome, Host, LogEntry, RewriteAction, Rule, RuleGroup, RulesetAction, RulesetOutcome,
    VariablesOutcome,
};
use crate::services::checkmk::{CheckmkRules, PoolDecision};
use crate::services::engine::{HostContext, OutcomeAccumulator, RuleSet};
use crate::services::filter::FilterAttributes;
use crate::services::folder_pool::FolderPoolAllocator;
use crate::services::groups::CheckmkGroups;
use crate::services::rewrite::RewriteAttributes;
use crate::services::variables::{CheckmkRulesets, CustomVariables};
use crate::utils::AppResult;

/// Final Checkmk data for one host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckmkExport {
    pub hostname: String,
    /// Labels that passed the Checkmk filter
    pub labels: BTreeMap<String, String>,
    pub outcome: CheckmkOutcome,
    pub matched_rules: Vec<String>,
}

/// A host a batch run could not export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostFailure {
    pub hostname: String,
    pub error: String,
}

/// Result of a batch Checkmk export
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub exports: Vec<CheckmkExport>,
    /// Hosts excluded by a filter rule
    pub ignored: Vec<String>,
    pub failures: Vec<HostFailure>,
    pub log: LogEntry,
}

/// Dry-run view of the Checkmk rules for one host
#[derive(Debug, Clone, Serialize)]
pub struct CheckmkDebug {
    pub hostname: String,
    /// Attributes after the rewrite rules
    pub attributes: BTreeMap<String, String>,
    pub filter: Evaluation<FilterOutcome>,
    pub rules: Vec<String>,
    pub pool_decision: PoolDecision,
    pub outcome: CheckmkOutcome,
}

/// Dry-run view of the Ansible rules for one host
#[derive(Debug, Clone, Serialize)]
pub struct AnsibleDebug {
    pub hostname: String,
    pub attributes: BTreeMap<String, String>,
    pub filter: Evaluation<FilterOutcome>,
    pub variables: Evaluation<VariablesOutcome>,
    pub hostvars: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryMeta {
    pub hostvars: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryGroup {
    pub hosts: Vec<String>,
}

/// Dynamic inventory in the shape `ansible-inventory --list` expects
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnsibleInventory {
    #[serde(rename = "_meta")]
    pub meta: InventoryMeta,
    pub all: InventoryGroup,
}

/// Compiled rule sets for a Checkmk export run
pub struct CheckmkPlan {
    rewrite: RuleSet<RewriteAction>,
    filter: RuleSet<FilterAction>,
    rules: RuleSet<CheckmkAction>,
}

/// Compiled rule sets for the Ansible inventory
pub struct AnsiblePlan {
    rewrite: RuleSet<RewriteAction>,
    filter: RuleSet<FilterAction>,
    variables: RuleSet<CustomVariableAction>,
}

/// Run the rewrite rules and return the context with the new attributes
fn rewritten(host: &Host, rules: &RuleSet<RewriteAction>) -> HostContext {
    let mut context = HostContext::from_host(host);
    context.attributes = rules.evaluate(&context, &RewriteAttributes).outcome;
    context
}

fn merge_hostvars(filter: &FilterOutcome, vars: &VariablesOutcome) -> BTreeMap<String, String> {
    let mut merged = filter.attributes.clone();
    merged.extend(vars.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

pub struct SyncService {
    repos: Repositories,
    pools: FolderPoolAllocator,
    concurrency: usize,
    record_runs: bool,
}

impl SyncService {
    /// Create the service and load the folder pools
    pub async fn new(repos: Repositories, export: &ExportConfig) -> AppResult<Self> {
        let pools = FolderPoolAllocator::new(repos.pools.list().await?);
        Ok(Self {
            repos,
            pools,
            concurrency: export.concurrency.max(1),
            record_runs: export.record_runs,
        })
    }

    pub fn repositories(&self) -> &Repositories {
        &self.repos
    }

    pub fn allocator(&self) -> &FolderPoolAllocator {
        &self.pools
    }

    /// Re-read the folder pools from storage
    pub async fn reload_pools(&self) -> AppResult<()> {
        self.pools.replace(self.repos.pools.list().await?).await;
        Ok(())
    }

    pub async fn folder_pools(&self) -> Vec<FolderPool> {
        self.pools.snapshot().await
    }

    /// Load the enabled rules of a group
    ///
    /// Records that do not decode (unknown operator or action) are logged
    /// and left out.
    pub async fn load_rules<A: DeserializeOwned>(&self, group: RuleGroup) -> AppResult<RuleSet<A>> {
        let records = self.repos.rules.list_enabled(group).await?;
        let mut rules: Vec<Rule<A>> = Vec::with_capacity(records.len());
        for record in records {
            match record.decode::<A>() {
                Ok(rule) => rules.push(rule),
                Err(e) => tracing::warn!("Skipping rule '{}' in {}: {}", record.name, group, e),
            }
        }
        Ok(RuleSet::compile(rules))
    }

    /// Evaluate one rule group against one stored host
    pub async fn evaluate<Acc>(
        &self,
        group: RuleGroup,
        hostname: &str,
        accumulator: &Acc,
    ) -> AppResult<Evaluation<Acc::Outcome>>
    where
        Acc: OutcomeAccumulator,
        Acc::Action: DeserializeOwned,
    {
        let host = self.repos.hosts.get(hostname).await?;
        let rules = self.load_rules::<Acc::Action>(group).await?;
        Ok(rules.evaluate(&HostContext::from_host(&host), accumulator))
    }

    /// Attributes a host exports to Netbox; `None` when the host is ignored
    pub async fn netbox_attributes(&self, hostname: &str) -> AppResult<Option<BTreeMap<String, String>>> {
        let filter = self
            .evaluate(RuleGroup::NetboxFilter, hostname, &FilterAttributes)
            .await?
            .outcome;
        Ok((!filter.ignore_host).then_some(filter.attributes))
    }

    pub async fn checkmk_plan(&self) -> AppResult<CheckmkPlan> {
        Ok(CheckmkPlan {
            rewrite: self.load_rules(RuleGroup::CheckmkRewriteLabels).await?,
            filter: self.load_rules(RuleGroup::CheckmkFilter).await?,
            rules: self.load_rules(RuleGroup::CheckmkRules).await?,
        })
    }

    /// Evaluate and commit the Checkmk rules for one host
    ///
    /// Returns `None` when a filter rule ignores the host. The pool decision
    /// is applied exactly once, after evaluation.
    pub async fn export_host(&self, plan: &CheckmkPlan, host: &Host) -> AppResult<Option<CheckmkExport>> {
        let context = rewritten(host, &plan.rewrite);

        let filter = plan.filter.evaluate(&context, &FilterAttributes).outcome;
        if filter.ignore_host {
            tracing::debug!("Host '{}' ignored by filter rules", host.hostname);
            return Ok(None);
        }

        let evaluation = plan.rules.evaluate(&context, &CheckmkRules);
        let decision = evaluation.outcome.pool_decision(context.locked_folder.as_deref());
        let commit = self.pools.commit(&host.hostname, &decision).await?;

        if let Some(lock) = &commit.lock_change {
            self.repos
                .hosts
                .set_locked_folder(&host.hostname, lock.as_deref())
                .await?;
        }
        if let Some((folder, delta)) = &commit.seat_change {
            self.repos.pools.adjust_seats(folder, *delta).await?;
        }

        Ok(Some(CheckmkExport {
            hostname: host.hostname.clone(),
            labels: filter.attributes,
            outcome: evaluation.outcome.finish(commit.folder.as_deref()),
            matched_rules: evaluation.matched_rules,
        }))
    }

    /// Evaluate and commit the Checkmk rules for one stored host
    pub async fn checkmk_outcome(&self, hostname: &str) -> AppResult<Option<CheckmkExport>> {
        let host = self.repos.hosts.get(hostname).await?;
        let plan = self.checkmk_plan().await?;
        self.export_host(&plan, &host).await
    }

    /// Export every host; failures are collected per host
    pub async fn export_checkmk(&self) -> AppResult<ExportSummary> {
        let plan = self.checkmk_plan().await?;
        let hosts = self.repos.hosts.list().await?;
        tracing::info!(
            "Exporting {} hosts with {} Checkmk rules",
            hosts.len(),
            plan.rules.len()
        );

        let plan = &plan;
        let results: Vec<(String, AppResult<Option<CheckmkExport>>)> = stream::iter(hosts)
            .map(|host| async move {
                let result = self.export_host(plan, &host).await;
                (host.hostname, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut exports = vec![];
        let mut ignored = vec![];
        let mut failures = vec![];
        for (hostname, result) in results {
            match result {
                Ok(Some(export)) => exports.push(export),
                Ok(None) => ignored.push(hostname),
                Err(e) => {
                    tracing::error!("Export of host '{}' failed: {}", hostname, e);
                    failures.push(HostFailure {
                        hostname,
                        error: e.to_string(),
                    });
                }
            }
        }
        exports.sort_by(|a, b| a.hostname.cmp(&b.hostname));
        ignored.sort();
        failures.sort_by(|a, b| a.hostname.cmp(&b.hostname));

        let mut log = LogEntry::new(
            "checkmk-export",
            format!(
                "Exported {} hosts, {} ignored, {} failed",
                exports.len(),
                ignored.len(),
                failures.len()
            ),
        );
        for export in &exports {
            log.info(format!(
                "{}: {}",
                export.hostname,
                export.outcome.move_folder.as_deref().unwrap_or("/")
            ));
        }
        for failure in &failures {
            log.error(format!("{}: {}", failure.hostname, failure.error));
        }
        if self.record_runs {
            self.repos.logs.record(&log).await?;
        }

        Ok(ExportSummary {
            exports,
            ignored,
            failures,
            log,
        })
    }

    /// Show what the Checkmk rules would do for a host, without committing
    pub async fn checkmk_debug(&self, hostname: &str) -> AppResult<CheckmkDebug> {
        let host = self.repos.hosts.get(hostname).await?;
        let plan = self.checkmk_plan().await?;
        let context = rewritten(&host, &plan.rewrite);

        let filter = plan.filter.evaluate(&context, &FilterAttributes);
        let evaluation = plan.rules.evaluate(&context, &CheckmkRules);
        let pool_decision = evaluation.outcome.pool_decision(context.locked_folder.as_deref());
        let pool_folder = match &pool_decision {
            PoolDecision::Keep(folder) => Some(folder.as_str()),
            _ => None,
        };
        let outcome = evaluation.outcome.finish(pool_folder);

        Ok(CheckmkDebug {
            hostname: host.hostname.clone(),
            attributes: context.attributes,
            filter,
            rules: evaluation.matched_rules,
            pool_decision,
            outcome,
        })
    }

    /// Group memberships over all hosts
    pub async fn checkmk_groups(&self) -> AppResult<GroupOutcome> {
        let rewrite = self.load_rules::<RewriteAction>(RuleGroup::CheckmkRewriteLabels).await?;
        let rules = self.load_rules::<GroupAction>(RuleGroup::CheckmkGroups).await?;

        let mut groups = GroupOutcome::default();
        for host in self.repos.hosts.list().await? {
            let context = rewritten(&host, &rewrite);
            groups.merge(rules.evaluate(&context, &CheckmkGroups).outcome);
        }
        Ok(groups)
    }

    /// Ruleset outcomes of every host that matched at least one rule
    pub async fn checkmk_rulesets(&self) -> AppResult<Vec<Evaluation<RulesetOutcome>>> {
        let rewrite = self.load_rules::<RewriteAction>(RuleGroup::CheckmkRewriteLabels).await?;
        let rules = self.load_rules::<RulesetAction>(RuleGroup::CheckmkRulesets).await?;

        let mut evaluations = vec![];
        for host in self.repos.hosts.list().await? {
            let evaluation = rules.evaluate(&rewritten(&host, &rewrite), &CheckmkRulesets);
            if !evaluation.matched_rules.is_empty() {
                evaluations.push(evaluation);
            }
        }
        Ok(evaluations)
    }

    pub async fn ansible_plan(&self) -> AppResult<AnsiblePlan> {
        Ok(AnsiblePlan {
            rewrite: self.load_rules(RuleGroup::AnsibleRewriteAttributes).await?,
            filter: self.load_rules(RuleGroup::AnsibleFilter).await?,
            variables: self.load_rules(RuleGroup::AnsibleCustomVariables).await?,
        })
    }

    fn ansible_debug_for(&self, plan: &AnsiblePlan, host: &Host) -> AnsibleDebug {
        let context = rewritten(host, &plan.rewrite);
        let filter = plan.filter.evaluate(&context, &FilterAttributes);
        let variables = plan.variables.evaluate(&context, &CustomVariables);
        let hostvars = (!filter.outcome.ignore_host).then(|| merge_hostvars(&filter.outcome, &variables.outcome));

        AnsibleDebug {
            hostname: host.hostname.clone(),
            attributes: context.attributes,
            filter,
            variables,
            hostvars,
        }
    }

    /// Inventory of all hosts not ignored by the Ansible filter
    pub async fn ansible_inventory(&self) -> AppResult<AnsibleInventory> {
        let plan = self.ansible_plan().await?;
        let mut inventory = AnsibleInventory::default();
        for host in self.repos.hosts.list().await? {
            if let Some(vars) = self.ansible_debug_for(&plan, &host).hostvars {
                inventory.meta.hostvars.insert(host.hostname.clone(), vars);
                inventory.all.hosts.push(host.hostname);
            }
        }
        Ok(inventory)
    }

    /// Variables of one host; `None` when the host is ignored
    pub async fn ansible_host(&self, hostname: &str) -> AppResult<Option<BTreeMap<String, String>>> {
        Ok(self.ansible_debug(hostname).await?.hostvars)
    }

    pub async fn ansible_debug(&self, hostname: &str) -> AppResult<AnsibleDebug> {
        let host = self.repos.hosts.get(hostname).await?;
        let plan = self.ansible_plan().await?;
        Ok(self.ansible_debug_for(&plan, &host))
    }

    /// Most recent run log entries
    pub async fn recent_runs(&self, limit: i64) -> AppResult<Vec<LogEntry>> {
        self.repos.logs.recent(limit).await
    }
}

//! YAML import of hosts, folder pools and rules
//!
//! Every record is validated before it is stored. Rules are decoded into the
//! action type of their group and their conditions are compiled, so an
//! unknown operator or a broken pattern is rejected here and never reaches
//! the rule engine.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::Repositories;
use crate::models::{
    CheckmkAction, CustomVariableAction, FilterAction, FolderPool, GroupAction, Host, RewriteAction, Rule,
    RuleGroup, RuleRecord, RulesetAction,
};
use crate::services::conditions::CompiledConditionSet;
use crate::utils::{AppError, AppResult};

/// Document accepted by the `import` command
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportDocument {
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub folder_pools: Vec<FolderPool>,
    #[serde(default)]
    pub rules: BTreeMap<RuleGroup, Vec<serde_json::Value>>,
}

/// What an import stored and what it rejected
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub hosts: usize,
    pub folder_pools: usize,
    pub rules: usize,
    pub rejected: Vec<String>,
}

impl ImportDocument {
    pub fn from_yaml(contents: &str) -> AppResult<Self> {
        Ok(serde_norway::from_str(contents)?)
    }
}

fn typed_record<A>(document: serde_json::Value) -> AppResult<RuleRecord>
where
    A: DeserializeOwned + Serialize,
{
    let rule: Rule<A> = serde_json::from_value(document)?;
    rule.validate()?;
    CompiledConditionSet::compile(&rule.condition_set)?;
    RuleRecord::encode(&rule)
}

/// Check a rule document against its group and turn it into a record
pub fn validate_rule(group: RuleGroup, document: serde_json::Value) -> AppResult<RuleRecord> {
    match group {
        RuleGroup::CheckmkFilter | RuleGroup::AnsibleFilter | RuleGroup::NetboxFilter => {
            typed_record::<FilterAction>(document)
        }
        RuleGroup::CheckmkRewriteLabels | RuleGroup::AnsibleRewriteAttributes => {
            typed_record::<RewriteAction>(document)
        }
        RuleGroup::CheckmkRules => typed_record::<CheckmkAction>(document),
        RuleGroup::CheckmkGroups => typed_record::<GroupAction>(document),
        RuleGroup::CheckmkRulesets => typed_record::<RulesetAction>(document),
        RuleGroup::AnsibleCustomVariables => typed_record::<CustomVariableAction>(document),
    }
}

fn rule_label(group: RuleGroup, document: &serde_json::Value) -> String {
    let name = document
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or("<unnamed>");
    format!("{}/{}", group, name)
}

/// Validate and store everything in the document
///
/// Invalid records are skipped and listed in the report; storage errors
/// abort the import.
pub async fn import_document(repos: &Repositories, document: ImportDocument) -> AppResult<ImportReport> {
    let mut report = ImportReport::default();

    for host in document.hosts {
        if let Err(e) = host.validate() {
            tracing::warn!("Rejected host '{}': {}", host.hostname, e);
            report.rejected.push(format!("host {}: {}", host.hostname, AppError::from(e)));
            continue;
        }
        repos.hosts.upsert(&host).await?;
        report.hosts += 1;
    }

    for pool in document.folder_pools {
        if let Err(e) = pool.validate() {
            tracing::warn!("Rejected folder pool '{}': {}", pool.folder_name, e);
            report
                .rejected
                .push(format!("folder pool {}: {}", pool.folder_name, AppError::from(e)));
            continue;
        }
        match repos.pools.upsert(&pool).await {
            Ok(()) => report.folder_pools += 1,
            Err(e @ AppError::Validation(_)) => {
                tracing::warn!("Rejected folder pool '{}': {}", pool.folder_name, e);
                report.rejected.push(format!("folder pool {}: {}", pool.folder_name, e));
            }
            Err(e) => return Err(e),
        }
    }

    for (group, documents) in document.rules {
        for document in documents {
            let label = rule_label(group, &document);
            match validate_rule(group, document) {
                Ok(record) => {
                    repos.rules.upsert(group, &record).await?;
                    report.rules += 1;
                }
                Err(e) => {
                    tracing::warn!("Rejected rule {}: {}", label, e);
                    report.rejected.push(format!("rule {}: {}", label, e));
                }
            }
        }
    }

    tracing::info!(
        "Imported {} hosts, {} folder pools, {} rules ({} rejected)",
        report.hosts,
        report.folder_pools,
        report.rules,
        report.rejected.len()
    );
    Ok(report)
}

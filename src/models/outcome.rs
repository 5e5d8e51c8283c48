//! Outcome data model
//!
//! Outcome maps are built fresh for every evaluation and handed to the
//! exporters. Their serialized keys are a stable contract.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::RulesetAction;

/// Result of evaluating one rule group against one host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation<O> {
    /// Host the rules were evaluated for
    pub hostname: String,

    /// Accumulated outcome of all matching rules
    pub outcome: O,

    /// Names of the rules that matched, in evaluation order
    pub matched_rules: Vec<String>,
}

impl<O> Evaluation<O> {
    pub fn map<P>(self, f: impl FnOnce(O) -> P) -> Evaluation<P> {
        Evaluation {
            hostname: self.hostname,
            outcome: f(self.outcome),
            matched_rules: self.matched_rules,
        }
    }
}

/// Outcome of attribute filter rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOutcome {
    /// Attributes that passed the whitelist
    pub attributes: BTreeMap<String, String>,

    /// The host is excluded from the export
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_host: bool,
}

/// Outcome of Checkmk export rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckmkOutcome {
    /// Target folder; absent when no folder rule applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_folder: Option<String>,

    /// Attributes passed to the exporter
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Custom attributes, each a single-key map
    #[serde(default)]
    pub custom_attributes: Vec<BTreeMap<String, String>>,

    /// Attribute keys to remove from the host in Checkmk
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_attributes: Vec<String>,

    /// Cluster node names
    #[serde(default)]
    pub create_cluster: Vec<String>,
}

/// Outcome of Checkmk group rules: group kind → group names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupOutcome {
    pub groups: BTreeMap<String, BTreeSet<String>>,
}

impl GroupOutcome {
    pub fn add(&mut self, group_kind: &str, name: impl Into<String>) {
        self.groups
            .entry(group_kind.to_string())
            .or_default()
            .insert(name.into());
    }

    /// Merge another host's groups into this one
    pub fn merge(&mut self, other: GroupOutcome) {
        for (kind, names) in other.groups {
            self.groups.entry(kind).or_default().extend(names);
        }
    }
}

/// Outcome of Ansible custom variable rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariablesOutcome {
    pub vars: BTreeMap<String, String>,
}

/// Outcome of Checkmk ruleset rules: ruleset name → collected actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulesetOutcome {
    pub rulesets: BTreeMap<String, Vec<RulesetAction>>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

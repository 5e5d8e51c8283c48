//! Rule data model

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::ConditionSet;
use crate::utils::validation::rule_name_validator;
use crate::utils::{AppError, AppResult};

/// A rule of one family, parameterized by the family's action type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct Rule<A> {
    /// Rule name (unique within its rule group)
    #[validate(length(min = 1, max = 255), custom(function = "rule_name_validator"))]
    pub name: String,

    /// Disabled rules are never evaluated
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Evaluation order, ascending
    #[serde(default, alias = "sort_field")]
    pub sort_order: i64,

    /// Conditions deciding whether the rule fires
    #[serde(flatten)]
    pub condition_set: ConditionSet,

    /// Actions applied when the rule fires
    #[serde(default)]
    pub outcomes: Vec<A>,

    /// Stop evaluating further rules once this one fired
    #[serde(default, alias = "last_match")]
    pub stop_on_match: bool,
}

fn default_enabled() -> bool {
    true
}

impl<A> Rule<A> {
    /// Create an enabled rule with no conditions and no outcomes
    pub fn new(name: impl Into<String>, sort_order: i64) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            sort_order,
            condition_set: ConditionSet::default(),
            outcomes: vec![],
            stop_on_match: false,
        }
    }

    pub fn with_conditions(mut self, condition_set: ConditionSet) -> Self {
        self.condition_set = condition_set;
        self
    }

    pub fn with_outcomes(mut self, outcomes: Vec<A>) -> Self {
        self.outcomes = outcomes;
        self
    }

    pub fn stop_on_match(mut self, stop: bool) -> Self {
        self.stop_on_match = stop;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Rule collections known to the syncer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleGroup {
    CheckmkFilter,
    CheckmkRules,
    CheckmkGroups,
    CheckmkRulesets,
    CheckmkRewriteLabels,
    AnsibleFilter,
    AnsibleRewriteAttributes,
    AnsibleCustomVariables,
    NetboxFilter,
}

impl RuleGroup {
    pub const ALL: [RuleGroup; 9] = [
        RuleGroup::CheckmkFilter,
        RuleGroup::CheckmkRules,
        RuleGroup::CheckmkGroups,
        RuleGroup::CheckmkRulesets,
        RuleGroup::CheckmkRewriteLabels,
        RuleGroup::AnsibleFilter,
        RuleGroup::AnsibleRewriteAttributes,
        RuleGroup::AnsibleCustomVariables,
        RuleGroup::NetboxFilter,
    ];

    /// Identifier used in storage and import documents
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleGroup::CheckmkFilter => "checkmk_filter",
            RuleGroup::CheckmkRules => "checkmk_rules",
            RuleGroup::CheckmkGroups => "checkmk_groups",
            RuleGroup::CheckmkRulesets => "checkmk_rulesets",
            RuleGroup::CheckmkRewriteLabels => "checkmk_rewrite_labels",
            RuleGroup::AnsibleFilter => "ansible_filter",
            RuleGroup::AnsibleRewriteAttributes => "ansible_rewrite_attributes",
            RuleGroup::AnsibleCustomVariables => "ansible_custom_variables",
            RuleGroup::NetboxFilter => "netbox_filter",
        }
    }
}

impl FromStr for RuleGroup {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| AppError::NotFound(format!("Rule group '{}'", s)))
    }
}

impl fmt::Display for RuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule as held by the storage layer: the untyped document plus the
/// columns needed to select and order it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub name: String,
    pub enabled: bool,
    pub sort_order: i64,
    pub document: serde_json::Value,
}

impl RuleRecord {
    /// Build a record from a typed rule
    pub fn encode<A: Serialize>(rule: &Rule<A>) -> AppResult<Self> {
        Ok(Self {
            name: rule.name.clone(),
            enabled: rule.enabled,
            sort_order: rule.sort_order,
            document: serde_json::to_value(rule)?,
        })
    }

    /// Decode the document into a typed rule of one family
    ///
    /// Unknown operators and unknown actions surface here.
    pub fn decode<A: DeserializeOwned>(&self) -> AppResult<Rule<A>> {
        let mut rule: Rule<A> = serde_json::from_value(self.document.clone())
            .map_err(|e| decode_error(&self.name, e))?;
        rule.name = self.name.clone();
        rule.enabled = self.enabled;
        rule.sort_order = self.sort_order;
        Ok(rule)
    }
}

fn decode_error(name: &str, err: serde_json::Error) -> AppError {
    let message = err.to_string();
    if message.contains("Invalid operator") {
        AppError::InvalidOperator(format!("rule '{}': {}", name, message))
    } else {
        AppError::Serialization(format!("rule '{}': {}", name, message))
    }
}

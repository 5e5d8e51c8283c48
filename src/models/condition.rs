//! Condition data model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::AppError;

/// Comparison operators available to host and attribute conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchOperator {
    /// Case-insensitive equality
    Equal,
    /// Needle is a substring of the value
    In,
    /// Value is one of the comma-separated needle tokens
    InList,
    /// Value starts with the needle
    StartsWith,
    /// Value ends with the needle
    EndsWith,
    /// Needle is a pattern matched at the start of the value
    Regex,
    /// Both sides parsed as booleans
    Bool,
    /// Always matches
    Ignore,
}

impl MatchOperator {
    /// Canonical name as stored in rule documents
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOperator::Equal => "equal",
            MatchOperator::In => "in",
            MatchOperator::InList => "in_list",
            MatchOperator::StartsWith => "startswith",
            MatchOperator::EndsWith => "endswith",
            MatchOperator::Regex => "regex",
            MatchOperator::Bool => "bool",
            MatchOperator::Ignore => "ignore",
        }
    }
}

impl FromStr for MatchOperator {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(MatchOperator::Equal),
            "in" => Ok(MatchOperator::In),
            "in_list" => Ok(MatchOperator::InList),
            // swith/ewith are the names older rule documents use
            "startswith" | "swith" => Ok(MatchOperator::StartsWith),
            "endswith" | "ewith" => Ok(MatchOperator::EndsWith),
            "regex" => Ok(MatchOperator::Regex),
            "bool" => Ok(MatchOperator::Bool),
            "ignore" => Ok(MatchOperator::Ignore),
            other => Err(AppError::InvalidOperator(other.to_string())),
        }
    }
}

impl TryFrom<String> for MatchOperator {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MatchOperator> for String {
    fn from(op: MatchOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for MatchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level predicate of a rule
///
/// The `match_type` tag selects which shape is populated, so a condition is
/// always either a hostname test or an attribute key/value test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match_type", rename_all = "lowercase")]
pub enum Condition {
    /// Test against the host's identity
    Host {
        hostname_operator: MatchOperator,
        #[serde(default)]
        hostname_pattern: String,
        #[serde(default)]
        negate: bool,
    },
    /// Test against one key/value pair of the host's attributes
    Attribute {
        key_operator: MatchOperator,
        #[serde(default)]
        key_pattern: String,
        #[serde(default)]
        key_negate: bool,
        value_operator: MatchOperator,
        #[serde(default)]
        value_pattern: String,
        #[serde(default)]
        value_negate: bool,
    },
}

impl Condition {
    /// Hostname condition without negation
    pub fn host(operator: MatchOperator, pattern: impl Into<String>) -> Self {
        Condition::Host {
            hostname_operator: operator,
            hostname_pattern: pattern.into(),
            negate: false,
        }
    }

    /// Attribute condition without negation on either side
    pub fn attribute(
        key_operator: MatchOperator,
        key_pattern: impl Into<String>,
        value_operator: MatchOperator,
        value_pattern: impl Into<String>,
    ) -> Self {
        Condition::Attribute {
            key_operator,
            key_pattern: key_pattern.into(),
            key_negate: false,
            value_operator,
            value_pattern: value_pattern.into(),
            value_negate: false,
        }
    }

    /// Condition that matches every host
    pub fn always() -> Self {
        Condition::host(MatchOperator::Ignore, "")
    }
}

/// How the conditions of a rule are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConditionType {
    /// All conditions must match (AND)
    #[default]
    All,
    /// Any condition must match (OR)
    Any,
}

/// Ordered conditions plus their combinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionSet {
    #[serde(default, alias = "condition_typ")]
    pub condition_type: ConditionType,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ConditionSet {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            condition_type: ConditionType::All,
            conditions,
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            condition_type: ConditionType::Any,
            conditions,
        }
    }
}

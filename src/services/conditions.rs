//! Condition set evaluation

use crate::models::{Condition, ConditionSet, ConditionType};
use crate::services::engine::HostContext;
use crate::services::matcher::Matcher;
use crate::utils::AppResult;

/// A condition with its matchers compiled
#[derive(Debug, Clone)]
pub enum CompiledCondition {
    Host(Matcher),
    Attribute { key: Matcher, value: Matcher },
}

impl CompiledCondition {
    pub fn compile(condition: &Condition) -> AppResult<Self> {
        match condition {
            Condition::Host {
                hostname_operator,
                hostname_pattern,
                negate,
            } => Ok(CompiledCondition::Host(Matcher::new(
                *hostname_operator,
                hostname_pattern,
                *negate,
            )?)),
            Condition::Attribute {
                key_operator,
                key_pattern,
                key_negate,
                value_operator,
                value_pattern,
                value_negate,
            } => Ok(CompiledCondition::Attribute {
                key: Matcher::new(*key_operator, key_pattern, *key_negate)?,
                value: Matcher::new(*value_operator, value_pattern, *value_negate)?,
            }),
        }
    }

    /// Host conditions test the hostname; attribute conditions need one
    /// attribute pair that passes both the key and the value matcher.
    pub fn matches(&self, host: &HostContext) -> bool {
        match self {
            CompiledCondition::Host(matcher) => matcher.is_match(&host.hostname),
            CompiledCondition::Attribute { key, value } => host
                .attributes
                .iter()
                .any(|(k, v)| key.is_match(k) && value.is_match(v)),
        }
    }
}

/// A condition set with every condition compiled
#[derive(Debug, Clone)]
pub struct CompiledConditionSet {
    condition_type: ConditionType,
    conditions: Vec<CompiledCondition>,
}

impl CompiledConditionSet {
    pub fn compile(set: &ConditionSet) -> AppResult<Self> {
        let conditions = set
            .conditions
            .iter()
            .map(CompiledCondition::compile)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            condition_type: set.condition_type,
            conditions,
        })
    }

    /// `all` over an empty set is true, `any` over an empty set is false
    pub fn matches(&self, host: &HostContext) -> bool {
        match self.condition_type {
            ConditionType::All => self.conditions.iter().all(|c| c.matches(host)),
            ConditionType::Any => self.conditions.iter().any(|c| c.matches(host)),
        }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Compile and evaluate a condition set in one go
pub fn evaluate(host: &HostContext, set: &ConditionSet) -> AppResult<bool> {
    Ok(CompiledConditionSet::compile(set)?.matches(host))
}

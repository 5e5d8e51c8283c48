//! Rule engine
//!
//! Rules of one family are compiled once into a [`RuleSet`] and then folded
//! over any number of hosts. What a matching rule contributes is decided by
//! the family's [`OutcomeAccumulator`].

use std::collections::BTreeMap;

use crate::models::{Evaluation, Host, Rule};
use crate::services::conditions::CompiledConditionSet;

/// The view of a host that rules are evaluated against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub hostname: String,
    pub attributes: BTreeMap<String, String>,
    pub locked_folder: Option<String>,
}

impl HostContext {
    pub fn new(hostname: impl Into<String>, attributes: BTreeMap<String, String>) -> Self {
        Self {
            hostname: hostname.into(),
            attributes,
            locked_folder: None,
        }
    }

    pub fn from_host(host: &Host) -> Self {
        Self {
            hostname: host.hostname.clone(),
            attributes: host.match_attributes(),
            locked_folder: host.locked_folder.clone(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Accumulation step of one rule family
///
/// `apply` receives the running outcome by value and returns the next one,
/// so a pass over the rules is a plain fold.
pub trait OutcomeAccumulator {
    type Action;
    type Outcome;

    /// Outcome before any rule matched
    fn initial(&self, host: &HostContext) -> Self::Outcome;

    /// Fold the actions of one matching rule into the outcome
    fn apply(
        &self,
        host: &HostContext,
        actions: &[Self::Action],
        outcome: Self::Outcome,
    ) -> Self::Outcome;
}

/// A rule with its conditions compiled
#[derive(Debug, Clone)]
pub struct CompiledRule<A> {
    pub name: String,
    pub sort_order: i64,
    pub stop_on_match: bool,
    pub conditions: CompiledConditionSet,
    pub outcomes: Vec<A>,
}

impl<A> CompiledRule<A> {
    pub fn matches(&self, host: &HostContext) -> bool {
        self.conditions.matches(host)
    }
}

/// Enabled rules of one family in evaluation order
#[derive(Debug, Clone)]
pub struct RuleSet<A> {
    rules: Vec<CompiledRule<A>>,
    skipped: Vec<String>,
}

impl<A> Default for RuleSet<A> {
    fn default() -> Self {
        Self {
            rules: vec![],
            skipped: vec![],
        }
    }
}

impl<A> RuleSet<A> {
    /// Compile rules for evaluation
    ///
    /// Disabled rules are dropped. The remaining rules are stable-sorted by
    /// `sort_order`, so ties keep the order they were given in. A rule whose
    /// conditions fail to compile is logged and left out.
    pub fn compile(rules: Vec<Rule<A>>) -> Self {
        let mut enabled: Vec<Rule<A>> = rules.into_iter().filter(|r| r.enabled).collect();
        enabled.sort_by_key(|r| r.sort_order);

        let mut compiled = Vec::with_capacity(enabled.len());
        let mut skipped = vec![];
        for rule in enabled {
            match CompiledConditionSet::compile(&rule.condition_set) {
                Ok(conditions) => compiled.push(CompiledRule {
                    name: rule.name,
                    sort_order: rule.sort_order,
                    stop_on_match: rule.stop_on_match,
                    conditions,
                    outcomes: rule.outcomes,
                }),
                Err(e) => {
                    tracing::warn!("Skipping rule '{}': {}", rule.name, e);
                    skipped.push(rule.name);
                }
            }
        }

        Self {
            rules: compiled,
            skipped,
        }
    }

    pub fn rules(&self) -> &[CompiledRule<A>] {
        &self.rules
    }

    /// Names of rules left out because their conditions did not compile
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Fold every matching rule into a fresh outcome
    pub fn evaluate<Acc>(&self, host: &HostContext, accumulator: &Acc) -> Evaluation<Acc::Outcome>
    where
        Acc: OutcomeAccumulator<Action = A>,
    {
        let mut outcome = accumulator.initial(host);
        let mut matched_rules = vec![];

        for rule in &self.rules {
            if !rule.matches(host) {
                continue;
            }

            tracing::debug!(
                "Rule '{}' (sort_order={}) matched host '{}'",
                rule.name,
                rule.sort_order,
                host.hostname
            );
            outcome = accumulator.apply(host, &rule.outcomes, outcome);
            matched_rules.push(rule.name.clone());

            if rule.stop_on_match {
                tracing::debug!(
                    "Rule '{}' stops evaluation for host '{}'",
                    rule.name,
                    host.hostname
                );
                break;
            }
        }

        Evaluation {
            hostname: host.hostname.clone(),
            outcome,
            matched_rules,
        }
    }
}

/// Compile `rules` and evaluate them against a single host
pub fn evaluate_ruleset<A, Acc>(
    host: &HostContext,
    rules: Vec<Rule<A>>,
    accumulator: &Acc,
) -> Evaluation<Acc::Outcome>
where
    Acc: OutcomeAccumulator<Action = A>,
{
    RuleSet::compile(rules).evaluate(host, accumulator)
}

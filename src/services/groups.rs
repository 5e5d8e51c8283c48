//! Checkmk group membership accumulator

use regex::Regex;

use crate::models::{ForeachType, GroupAction, GroupOutcome, GroupPattern};
use crate::services::engine::{HostContext, OutcomeAccumulator};

/// Collects group names per group kind
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckmkGroups;

/// Key selector for `foreach_type = value`: exact key or `prefix*`
fn key_matches(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

/// Run the optional extraction pattern over a candidate group name
///
/// Returns the first capture group when the pattern has one, the whole match
/// otherwise, and `None` when it does not match.
fn extract<'a>(regex: Option<&Regex>, candidate: &'a str) -> Option<&'a str> {
    let Some(regex) = regex else {
        return Some(candidate);
    };
    let captures = regex.captures(candidate)?;
    captures
        .get(1)
        .or_else(|| captures.get(0))
        .map(|m| m.as_str())
}

impl CheckmkGroups {
    fn apply_action(&self, host: &HostContext, action: &GroupAction, outcome: &mut GroupOutcome) {
        let regex = action.regex.as_ref().map(GroupPattern::regex);

        let candidates: Vec<&str> = match action.foreach_type {
            ForeachType::Value => host
                .attributes
                .iter()
                .filter(|(key, _)| key_matches(&action.foreach, key))
                .map(|(_, value)| value.as_str())
                .collect(),
            ForeachType::Label => host
                .attributes
                .iter()
                .filter(|(_, value)| **value == action.foreach)
                .map(|(key, _)| key.as_str())
                .collect(),
        };

        for candidate in candidates {
            match extract(regex, candidate) {
                Some(name) if !name.is_empty() => outcome.add(&action.group_name, name),
                _ => tracing::debug!(
                    "Group candidate '{}' for {} filtered out",
                    candidate,
                    action.group_name
                ),
            }
        }
    }
}

impl OutcomeAccumulator for CheckmkGroups {
    type Action = GroupAction;
    type Outcome = GroupOutcome;

    fn initial(&self, _host: &HostContext) -> GroupOutcome {
        GroupOutcome::default()
    }

    fn apply(&self, host: &HostContext, actions: &[GroupAction], mut outcome: GroupOutcome) -> GroupOutcome {
        for action in actions {
            self.apply_action(host, action, &mut outcome);
        }
        outcome
    }
}

//! Attribute rewrite accumulator

use std::collections::BTreeMap;

use crate::models::RewriteAction;
use crate::services::engine::{HostContext, OutcomeAccumulator};

/// Renames attributes; the outcome starts out as the host's attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteAttributes;

impl OutcomeAccumulator for RewriteAttributes {
    type Action = RewriteAction;
    type Outcome = BTreeMap<String, String>;

    fn initial(&self, host: &HostContext) -> BTreeMap<String, String> {
        host.attributes.clone()
    }

    fn apply(
        &self,
        _host: &HostContext,
        actions: &[RewriteAction],
        mut outcome: BTreeMap<String, String>,
    ) -> BTreeMap<String, String> {
        for action in actions {
            if let Some(value) = outcome.remove(&action.old_name) {
                outcome.insert(action.new_name.clone(), value);
            }
        }
        outcome
    }
}

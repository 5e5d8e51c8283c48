//! Ansible custom variables and Checkmk ruleset accumulators

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::{CustomVariableAction, RulesetAction, RulesetOutcome, VariablesOutcome};
use crate::services::engine::{HostContext, OutcomeAccumulator};

/// Sets inventory variables; later rules overwrite earlier ones
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomVariables;

impl OutcomeAccumulator for CustomVariables {
    type Action = CustomVariableAction;
    type Outcome = VariablesOutcome;

    fn initial(&self, _host: &HostContext) -> VariablesOutcome {
        VariablesOutcome::default()
    }

    fn apply(
        &self,
        host: &HostContext,
        actions: &[CustomVariableAction],
        mut outcome: VariablesOutcome,
    ) -> VariablesOutcome {
        for action in actions {
            let value = action.attribute_value.replace("{{hostname}}", &host.hostname);
            outcome.vars.insert(action.attribute_name.clone(), value);
        }
        outcome
    }
}

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());

/// Substitute `{{hostname}}` and `{{<attribute>}}` placeholders
///
/// Substituted values are never expanded again. Unknown placeholders are
/// left as they are.
pub fn render_template(template: &str, host: &HostContext) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            if key == "hostname" {
                host.hostname.clone()
            } else {
                host.attribute(key).map_or_else(|| caps[0].to_string(), str::to_string)
            }
        })
        .into_owned()
}

/// Groups ruleset actions by ruleset name, templates rendered for the host
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckmkRulesets;

impl OutcomeAccumulator for CheckmkRulesets {
    type Action = RulesetAction;
    type Outcome = RulesetOutcome;

    fn initial(&self, _host: &HostContext) -> RulesetOutcome {
        RulesetOutcome::default()
    }

    fn apply(
        &self,
        host: &HostContext,
        actions: &[RulesetAction],
        mut outcome: RulesetOutcome,
    ) -> RulesetOutcome {
        for action in actions {
            let rendered = RulesetAction {
                ruleset: action.ruleset.clone(),
                folder: render_template(&action.folder, host),
                value_template: render_template(&action.value_template, host),
                condition_label_template: render_template(&action.condition_label_template, host),
            };
            outcome
                .rulesets
                .entry(action.ruleset.clone())
                .or_default()
                .push(rendered);
        }
        outcome
    }
}

//! Attribute filter accumulator

use crate::models::{FilterAction, FilterOutcome};
use crate::services::engine::{HostContext, OutcomeAccumulator};

/// Whitelists host attributes into a [`FilterOutcome`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterAttributes;

impl OutcomeAccumulator for FilterAttributes {
    type Action = FilterAction;
    type Outcome = FilterOutcome;

    fn initial(&self, _host: &HostContext) -> FilterOutcome {
        FilterOutcome::default()
    }

    fn apply(
        &self,
        host: &HostContext,
        actions: &[FilterAction],
        mut outcome: FilterOutcome,
    ) -> FilterOutcome {
        for action in actions {
            match action {
                FilterAction::WhitelistAttribute { attribute_name } => {
                    match attribute_name.strip_suffix('*') {
                        Some(prefix) => {
                            for (key, value) in &host.attributes {
                                if key.starts_with(prefix) {
                                    outcome.attributes.insert(key.clone(), value.clone());
                                }
                            }
                        }
                        None => {
                            // Empty values are not carried over
                            if let Some(value) = host.attribute(attribute_name).filter(|v| !v.is_empty()) {
                                outcome
                                    .attributes
                                    .insert(attribute_name.clone(), value.to_string());
                            }
                        }
                    }
                }
                FilterAction::WhitelistAttributeValue { attribute_name } => {
                    for (key, value) in &host.attributes {
                        if value.starts_with(attribute_name.as_str()) {
                            outcome.attributes.insert(key.clone(), value.clone());
                        }
                    }
                }
                FilterAction::IgnoreHost => outcome.ignore_host = true,
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Host;

    fn host() -> HostContext {
        HostContext::from_host(
            &Host::new("srv1")
                .with_attribute("ip", "10.0.0.1")
                .with_attribute("name", "srv1")
                .with_attribute("os_family", "linux")
                .with_attribute("os_version", "12")
                .with_attribute("empty", ""),
        )
    }

    fn apply(actions: Vec<FilterAction>) -> FilterOutcome {
        FilterAttributes.apply(&host(), &actions, FilterOutcome::default())
    }

    #[test]
    fn test_whitelist_by_value_prefix() {
        let outcome = apply(vec![FilterAction::WhitelistAttributeValue {
            attribute_name: "10.".to_string(),
        }]);
        assert_eq!(outcome.attributes.len(), 1);
        assert_eq!(outcome.attributes["ip"], "10.0.0.1");
        assert!(!outcome.ignore_host);
    }

    #[test]
    fn test_whitelist_exact_key() {
        let outcome = apply(vec![
            FilterAction::WhitelistAttribute {
                attribute_name: "name".to_string(),
            },
            FilterAction::WhitelistAttribute {
                attribute_name: "missing".to_string(),
            },
            FilterAction::WhitelistAttribute {
                attribute_name: "empty".to_string(),
            },
        ]);
        assert_eq!(outcome.attributes.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_whitelist_key_prefix() {
        let outcome = apply(vec![FilterAction::WhitelistAttribute {
            attribute_name: "os_*".to_string(),
        }]);
        assert_eq!(
            outcome.attributes.keys().collect::<Vec<_>>(),
            vec!["os_family", "os_version"]
        );
    }

    #[test]
    fn test_value_prefix_is_case_sensitive() {
        let outcome = apply(vec![FilterAction::WhitelistAttributeValue {
            attribute_name: "Linux".to_string(),
        }]);
        assert!(outcome.attributes.is_empty());
    }

    #[test]
    fn test_ignore_host() {
        let outcome = apply(vec![FilterAction::IgnoreHost]);
        assert!(outcome.ignore_host);
        assert!(outcome.attributes.is_empty());
    }
}

//! Attribute filter step definitions

use cucumber::{given, then};

use crate::features::support::TestWorld;
use cmdb_syncer::models::{FilterAction, Rule};

#[given(expr = "a filter rule keeping attributes whose value starts with {string}")]
async fn keep_values_starting_with(world: &mut TestWorld, prefix: String) {
    let rule = Rule::new(format!("keep {}", prefix), 0).with_outcomes(vec![
        FilterAction::WhitelistAttributeValue {
            attribute_name: prefix,
        },
    ]);
    world.filter_rules.push(rule);
}

#[given(expr = "a filter rule keeping the attribute {string}")]
async fn keep_attribute(world: &mut TestWorld, name: String) {
    let rule = Rule::new(format!("keep {}", name), 0).with_outcomes(vec![
        FilterAction::WhitelistAttribute {
            attribute_name: name,
        },
    ]);
    world.filter_rules.push(rule);
}

#[then(expr = "host {string} exports the attributes {string}")]
async fn exports_attributes(world: &mut TestWorld, hostname: String, expected: String) {
    let export = world
        .last_export()
        .exports
        .iter()
        .find(|e| e.hostname == hostname)
        .unwrap_or_else(|| panic!("Host {} was not exported", hostname));

    let expected: Vec<&str> = expected
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let actual: Vec<&str> = export.labels.keys().map(String::as_str).collect();
    assert_eq!(actual, expected);
}

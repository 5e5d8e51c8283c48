//! Checkmk rule step definitions

use cucumber::given;

use crate::features::support::TestWorld;
use cmdb_syncer::models::{CheckmkAction, Condition, ConditionSet, MatchOperator, Rule};

#[given(expr = "a checkmk rule {string} with sort order {int} moving all hosts to {string}")]
async fn rule_for_all_hosts(world: &mut TestWorld, name: String, sort_order: i64, folder: String) {
    let rule = Rule::new(name, sort_order).with_outcomes(vec![CheckmkAction::MoveFolder(folder)]);
    world.checkmk_rules.push(rule);
}

#[given(
    expr = "a checkmk rule {string} with sort order {int} moving hosts where {string} is {string} to {string}"
)]
async fn rule_for_attribute(
    world: &mut TestWorld,
    name: String,
    sort_order: i64,
    key: String,
    value: String,
    folder: String,
) {
    let condition = Condition::attribute(MatchOperator::Equal, key, MatchOperator::Equal, value);
    let rule = Rule::new(name, sort_order)
        .with_conditions(ConditionSet::all(vec![condition]))
        .with_outcomes(vec![CheckmkAction::MoveFolder(folder)]);
    world.checkmk_rules.push(rule);
}

#[given(expr = "rule {string} stops on match")]
async fn rule_stops_on_match(world: &mut TestWorld, name: String) {
    world.checkmk_rule_mut(&name).stop_on_match = true;
}

#[given(expr = "rule {string} has sort order {int}")]
async fn rule_sort_order(world: &mut TestWorld, name: String, sort_order: i64) {
    world.checkmk_rule_mut(&name).sort_order = sort_order;
}

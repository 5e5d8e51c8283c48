//! Folder pool step definitions

use cucumber::{given, then};

use crate::features::support::TestWorld;
use cmdb_syncer::models::{CheckmkAction, Condition, ConditionSet, MatchOperator, Rule};

#[given(expr = "a checkmk rule {string} placing every host into a pool")]
async fn pool_rule_for_all(world: &mut TestWorld, name: String) {
    let rule = Rule::new(name, 0).with_outcomes(vec![CheckmkAction::FolderPool(String::new())]);
    world.checkmk_rules.push(rule);
}

#[given(expr = "a checkmk rule {string} placing hosts where {string} is {string} into a pool")]
async fn pool_rule_for_attribute(world: &mut TestWorld, name: String, key: String, value: String) {
    let condition = Condition::attribute(MatchOperator::Equal, key, MatchOperator::Equal, value);
    let rule = Rule::new(name, 0)
        .with_conditions(ConditionSet::all(vec![condition]))
        .with_outcomes(vec![CheckmkAction::FolderPool(String::new())]);
    world.checkmk_rules.push(rule);
}

#[then(expr = "pool {string} has {int} seat(s) taken")]
async fn seats_taken(world: &mut TestWorld, name: String, seats: u32) {
    let pools = world.repos.pools.list().await.expect("Failed to list pools");
    let pool = pools
        .iter()
        .find(|p| p.folder_name == name)
        .unwrap_or_else(|| panic!("No pool named {}", name));
    assert_eq!(pool.seats_taken, seats);
}

#[then(expr = "host {string} is locked to {string}")]
async fn locked_to(world: &mut TestWorld, hostname: String, folder: String) {
    let host = world.repos.hosts.get(&hostname).await.expect("Unknown host");
    assert_eq!(host.get_folder(), Some(folder.as_str()));
}

#[then(expr = "host {string} is not locked")]
async fn not_locked(world: &mut TestWorld, hostname: String) {
    let host = world.repos.hosts.get(&hostname).await.expect("Unknown host");
    assert!(host.get_folder().is_none());
}

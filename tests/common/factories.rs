//! Factories for hosts, folder pools and rules

use serde::Serialize;

use cmdb_syncer::db::Repositories;
use cmdb_syncer::models::{
    CheckmkAction, Condition, ConditionSet, FilterAction, FolderPool, Host, MatchOperator, Rule,
    RuleGroup, RuleRecord,
};

/// Host with the given attributes
pub fn host(hostname: &str, attributes: &[(&str, &str)]) -> Host {
    attributes
        .iter()
        .fold(Host::new(hostname), |host, (k, v)| host.with_attribute(*k, *v))
}

/// Attribute condition `key == value`
pub fn attribute_equals(key: &str, value: &str) -> Condition {
    Condition::attribute(MatchOperator::Equal, key, MatchOperator::Equal, value)
}

/// Checkmk rule with AND-combined conditions
pub fn checkmk_rule(
    name: &str,
    sort_order: i64,
    conditions: Vec<Condition>,
    outcomes: Vec<CheckmkAction>,
) -> Rule<CheckmkAction> {
    Rule::new(name, sort_order)
        .with_conditions(ConditionSet::all(conditions))
        .with_outcomes(outcomes)
}

/// Filter rule that fires for every host
pub fn filter_rule(name: &str, outcomes: Vec<FilterAction>) -> Rule<FilterAction> {
    Rule::new(name, 0).with_outcomes(outcomes)
}

pub fn pool(name: &str, seats: u32) -> FolderPool {
    FolderPool::new(name, seats)
}

pub async fn store_rule<A: Serialize>(repos: &Repositories, group: RuleGroup, rule: &Rule<A>) {
    let record = RuleRecord::encode(rule).expect("Failed to encode rule");
    repos
        .rules
        .upsert(group, &record)
        .await
        .expect("Failed to store rule");
}

pub async fn store_hosts(repos: &Repositories, hosts: &[Host]) {
    for host in hosts {
        repos.hosts.upsert(host).await.expect("Failed to store host");
    }
}

pub async fn store_pools(repos: &Repositories, pools: &[FolderPool]) {
    for pool in pools {
        repos.pools.upsert(pool).await.expect("Failed to store pool");
    }
}

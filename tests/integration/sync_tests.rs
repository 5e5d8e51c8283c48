//! Sync service tests against SQLite storage

use crate::common::*;
use cmdb_syncer::models::{
    CheckmkAction, Condition, CustomVariableAction, FilterAction, MatchOperator, RewriteAction, Rule,
    RuleGroup,
};

#[tokio::test]
async fn test_pool_exhaustion_fails_only_the_host() {
    let repos = sqlite_repositories().await;
    store_hosts(&repos, &[host("host1", &[]), host("host2", &[]), host("host3", &[])]).await;
    store_pools(&repos, &[pool("A", 1), pool("B", 1)]).await;
    store_rule(
        &repos,
        RuleGroup::CheckmkRules,
        &checkmk_rule("pool", 0, vec![], vec![CheckmkAction::FolderPool(String::new())]),
    )
    .await;

    let sync = sync_service(repos.clone()).await;
    let summary = sync.export_checkmk().await.unwrap();

    let folders: Vec<(&str, Option<&str>)> = summary
        .exports
        .iter()
        .map(|e| (e.hostname.as_str(), e.outcome.move_folder.as_deref()))
        .collect();
    assert_eq!(folders, vec![("host1", Some("/a")), ("host2", Some("/b"))]);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].hostname, "host3");
    assert!(summary.failures[0].error.contains("No pool folder available"));

    assert_eq!(repos.hosts.get("host1").await.unwrap().get_folder(), Some("A"));
    assert!(repos.hosts.get("host3").await.unwrap().get_folder().is_none());
    let pools = repos.pools.list().await.unwrap();
    assert!(pools.iter().all(|p| p.seats_taken == 1));

    let runs = repos.logs.recent(1).await.unwrap();
    assert!(runs[0].has_error);
    assert_eq!(runs[0].message, "Exported 2 hosts, 0 ignored, 1 failed");
}

#[tokio::test]
async fn test_sticky_lock_survives_restart() {
    let repos = sqlite_repositories().await;
    store_hosts(&repos, &[host("web01", &[])]).await;
    store_pools(&repos, &[pool("pool_a", 2)]).await;
    store_rule(
        &repos,
        RuleGroup::CheckmkRules,
        &checkmk_rule(
            "pooled",
            0,
            vec![],
            vec![
                CheckmkAction::MoveFolder("servers".to_string()),
                CheckmkAction::FolderPool(String::new()),
            ],
        ),
    )
    .await;

    let first = sync_service(repos.clone()).await;
    let outcome = first.checkmk_outcome("web01").await.unwrap().unwrap();
    assert_eq!(outcome.outcome.move_folder.as_deref(), Some("/servers/pool_a"));

    // a fresh service reads pools and locks back from storage
    let second = sync_service(repos.clone()).await;
    let again = second.checkmk_outcome("web01").await.unwrap().unwrap();
    assert_eq!(again.outcome.move_folder.as_deref(), Some("/servers/pool_a"));
    assert_eq!(repos.pools.list().await.unwrap()[0].seats_taken, 1);
}

#[tokio::test]
async fn test_rewrite_filter_and_rules_pipeline() {
    let repos = sqlite_repositories().await;
    store_hosts(
        &repos,
        &[
            host("web01", &[("environment", "prod"), ("ip", "10.0.0.5"), ("owner", "ops")]),
            host("lab01", &[("environment", "lab")]),
        ],
    )
    .await;

    let rewrite: Rule<RewriteAction> = Rule::new("rename", 0).with_outcomes(vec![RewriteAction {
        old_name: "environment".to_string(),
        new_name: "env".to_string(),
    }]);
    store_rule(&repos, RuleGroup::CheckmkRewriteLabels, &rewrite).await;

    let ignore_lab = filter_rule("ignore lab", vec![FilterAction::IgnoreHost])
        .with_conditions(cmdb_syncer::models::ConditionSet::all(vec![attribute_equals("env", "lab")]));
    store_rule(&repos, RuleGroup::CheckmkFilter, &ignore_lab).await;
    store_rule(
        &repos,
        RuleGroup::CheckmkFilter,
        &filter_rule(
            "keep ips",
            vec![FilterAction::WhitelistAttributeValue {
                attribute_name: "10.".to_string(),
            }],
        ),
    )
    .await;
    store_rule(
        &repos,
        RuleGroup::CheckmkRules,
        &checkmk_rule(
            "prod",
            0,
            vec![attribute_equals("env", "prod")],
            vec![CheckmkAction::ValueAsFolder("env".to_string())],
        ),
    )
    .await;

    let sync = sync_service(repos).await;
    let summary = sync.export_checkmk().await.unwrap();

    assert_eq!(summary.ignored, vec!["lab01"]);
    assert_eq!(summary.exports.len(), 1);
    let web01 = &summary.exports[0];
    assert_eq!(web01.outcome.move_folder.as_deref(), Some("/prod"));
    assert_eq!(web01.labels.keys().collect::<Vec<_>>(), vec!["ip"]);
    assert_eq!(web01.matched_rules, vec!["prod"]);
}

#[tokio::test]
async fn test_ansible_inventory_over_sqlite() {
    let repos = sqlite_repositories().await;
    store_hosts(
        &repos,
        &[host("web01", &[("role", "web")]), host("db01", &[("role", "db")])],
    )
    .await;

    let skip_db = filter_rule("skip db", vec![FilterAction::IgnoreHost]).with_conditions(
        cmdb_syncer::models::ConditionSet::all(vec![Condition::attribute(
            MatchOperator::Equal,
            "role",
            MatchOperator::StartsWith,
            "d",
        )]),
    );
    store_rule(&repos, RuleGroup::AnsibleFilter, &skip_db).await;
    store_rule(
        &repos,
        RuleGroup::AnsibleFilter,
        &filter_rule(
            "keep role",
            vec![FilterAction::WhitelistAttribute {
                attribute_name: "role".to_string(),
            }],
        ),
    )
    .await;
    let vars: Rule<CustomVariableAction> = Rule::new("host", 0).with_outcomes(vec![CustomVariableAction {
        attribute_name: "ansible_host".to_string(),
        attribute_value: "{{hostname}}.example.com".to_string(),
    }]);
    store_rule(&repos, RuleGroup::AnsibleCustomVariables, &vars).await;

    let sync = sync_service(repos).await;
    let inventory = sync.ansible_inventory().await.unwrap();
    assert_eq!(inventory.all.hosts, vec!["web01"]);
    let hostvars = &inventory.meta.hostvars["web01"];
    assert_eq!(hostvars["role"], "web");
    assert_eq!(hostvars["ansible_host"], "web01.example.com");

    assert!(sync.ansible_host("db01").await.unwrap().is_none());
}

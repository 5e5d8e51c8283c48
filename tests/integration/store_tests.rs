//! SQLite repository tests

use crate::common::*;
use cmdb_syncer::models::{FilterAction, LogEntry, RuleGroup, RuleRecord};
use cmdb_syncer::AppError;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_host_roundtrip_and_lock() {
    let repos = sqlite_repositories().await;
    store_hosts(&repos, &[host("web02", &[]), host("web01", &[("env", "prod")])]).await;

    let hosts = repos.hosts.list().await.unwrap();
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[0].hostname, "web01");
    assert_eq!(hosts[0].attributes["env"], "prod");

    assert_ok!(repos.hosts.set_locked_folder("web01", Some("pool_a")).await);
    // a re-import without lock keeps the lock
    repos.hosts.upsert(&host("web01", &[("env", "test")])).await.unwrap();
    let web01 = repos.hosts.get("web01").await.unwrap();
    assert_eq!(web01.get_folder(), Some("pool_a"));
    assert_eq!(web01.attributes["env"], "test");

    repos.hosts.set_locked_folder("web01", None).await.unwrap();
    assert!(repos.hosts.get("web01").await.unwrap().get_folder().is_none());
}

#[tokio::test]
async fn test_missing_host() {
    let repos = sqlite_repositories().await;
    assert!(matches!(repos.hosts.get("nope").await, Err(AppError::NotFound(_))));
    assert_err!(repos.hosts.set_locked_folder("nope", Some("a")).await);
}

#[tokio::test]
async fn test_rules_ordered_per_group() {
    let repos = sqlite_repositories().await;
    store_rule(&repos, RuleGroup::CheckmkFilter, &filter_rule("second", vec![]).enabled(true)).await;

    let mut first = filter_rule("first", vec![FilterAction::IgnoreHost]);
    first.sort_order = -1;
    store_rule(&repos, RuleGroup::CheckmkFilter, &first).await;
    store_rule(&repos, RuleGroup::CheckmkFilter, &filter_rule("off", vec![]).enabled(false)).await;
    store_rule(&repos, RuleGroup::AnsibleFilter, &filter_rule("other group", vec![])).await;

    let records = repos.rules.list_enabled(RuleGroup::CheckmkFilter).await.unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);

    let decoded = records[0].decode::<FilterAction>().unwrap();
    assert_eq!(decoded.outcomes, vec![FilterAction::IgnoreHost]);
}

#[tokio::test]
async fn test_rule_upsert_replaces_by_name() {
    let repos = sqlite_repositories().await;
    store_rule(&repos, RuleGroup::NetboxFilter, &filter_rule("keep", vec![])).await;

    let record = RuleRecord {
        name: "keep".to_string(),
        enabled: true,
        sort_order: 4,
        document: serde_json::json!({"name": "keep", "outcomes": [{"action": "ignore_host"}]}),
    };
    repos.rules.upsert(RuleGroup::NetboxFilter, &record).await.unwrap();

    let records = repos.rules.list_enabled(RuleGroup::NetboxFilter).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sort_order, 4);
}

#[tokio::test]
async fn test_pools_keep_order_and_clamp_seats() {
    let repos = sqlite_repositories().await;
    store_pools(&repos, &[pool("pool_b", 1), pool("pool_a", 2)]).await;
    // updating an existing pool keeps its position
    repos.pools.upsert(&pool("pool_b", 3)).await.unwrap();

    let pools = repos.pools.list().await.unwrap();
    assert_eq!(pools[0].folder_name, "pool_b");
    assert_eq!(pools[0].seat_capacity, 3);
    assert_eq!(pools[1].folder_name, "pool_a");

    assert_ok!(repos.pools.adjust_seats("pool_a", 5).await);
    assert_eq!(repos.pools.list().await.unwrap()[1].seats_taken, 2);
    repos.pools.adjust_seats("pool_a", -3).await.unwrap();
    assert_eq!(repos.pools.list().await.unwrap()[1].seats_taken, 0);

    assert!(matches!(
        repos.pools.adjust_seats("pool_x", 1).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_log_entries() {
    let repos = sqlite_repositories().await;
    let mut entry = LogEntry::new("checkmk-export", "first run");
    entry.error("web03: No pool folder available for host web03");
    repos.logs.record(&entry).await.unwrap();
    repos.logs.record(&LogEntry::new("checkmk-export", "second run")).await.unwrap();

    let recent = repos.logs.recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].message, "second run");
    assert!(recent[1].has_error);
    assert_eq!(recent[1].details.len(), 1);
}

#[tokio::test]
async fn test_pool_upsert_rejects_shrink_below_taken() {
    let repos = sqlite_repositories().await;
    store_pools(&repos, &[pool("pool_a", 3)]).await;
    repos.pools.adjust_seats("pool_a", 2).await.unwrap();

    assert!(matches!(
        repos.pools.upsert(&pool("pool_a", 1)).await,
        Err(AppError::Validation(_))
    ));
    assert_ok!(repos.pools.upsert(&pool("pool_a", 2)).await);

    let stored = &repos.pools.list().await.unwrap()[0];
    assert_eq!((stored.seat_capacity, stored.seats_taken), (2, 2));
}

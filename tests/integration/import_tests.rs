//! YAML import followed by an export

use crate::common::*;
use cmdb_syncer::models::RuleGroup;
use cmdb_syncer::services::{import_document, ImportDocument};

const INVENTORY: &str = r#"
hosts:
  - hostname: srv-prod-01
    attributes:
      env: prod
      site: ber
  - hostname: srv-prod-02
    attributes:
      env: prod
      site: ber
  - hostname: srv-test-01
    labels:
      env: test
folder_pools:
  - folder_name: pool_1
    folder_seats: 1
  - folder_name: pool_2
    folder_seats: 1
rules:
  checkmk_rules:
    - name: site folder
      sort_field: 10
      conditions:
        - match_type: attribute
          key_operator: equal
          key_pattern: site
          value_operator: ignore
      outcomes:
        - action: value_as_folder
          action_param: site
    - name: prod pool
      sort_field: 20
      condition_typ: any
      conditions:
        - match_type: host
          hostname_operator: swith
          hostname_pattern: srv-prod
      outcomes:
        - action: folder_pool
          action_param: pool_1, pool_2
        - action: custom_attribute
          action_param: "alias:{{hostname}}"
  checkmk_groups:
    - name: envs
      outcomes:
        - group_name: host_groups
          foreach_type: value
          foreach: env
"#;

#[tokio::test]
async fn test_import_then_export() {
    let repos = sqlite_repositories().await;
    let sync = sync_service(repos.clone()).await;

    let document = ImportDocument::from_yaml(INVENTORY).unwrap();
    let report = import_document(&repos, document).await.unwrap();
    assert_eq!((report.hosts, report.folder_pools, report.rules), (3, 2, 3));
    assert!(report.rejected.is_empty());
    sync.reload_pools().await.unwrap();

    let summary = sync.export_checkmk().await.unwrap();
    assert!(summary.failures.is_empty());
    let folders: Vec<Option<&str>> = summary
        .exports
        .iter()
        .map(|e| e.outcome.move_folder.as_deref())
        .collect();
    assert_eq!(folders, vec![Some("/ber/pool_1"), Some("/ber/pool_2"), None]);
    assert_eq!(
        summary.exports[0].outcome.custom_attributes[0]["alias"],
        "srv-prod-01"
    );

    let groups = sync.checkmk_groups().await.unwrap();
    let envs: Vec<&String> = groups.groups["host_groups"].iter().collect();
    assert_eq!(envs, vec!["prod", "test"]);
}

#[tokio::test]
async fn test_reimport_keeps_locks() {
    let repos = sqlite_repositories().await;
    let sync = sync_service(repos.clone()).await;
    import_document(&repos, ImportDocument::from_yaml(INVENTORY).unwrap())
        .await
        .unwrap();
    sync.reload_pools().await.unwrap();
    sync.export_checkmk().await.unwrap();

    import_document(&repos, ImportDocument::from_yaml(INVENTORY).unwrap())
        .await
        .unwrap();
    assert_eq!(
        repos.hosts.get("srv-prod-01").await.unwrap().get_folder(),
        Some("pool_1")
    );
    let pools = repos.pools.list().await.unwrap();
    assert!(pools.iter().all(|p| p.seats_taken == 1));
    assert_eq!(
        repos.rules.list_enabled(RuleGroup::CheckmkRules).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_reimport_rejects_pool_shrunk_below_locked_hosts() {
    let repos = sqlite_repositories().await;
    let sync = sync_service(repos.clone()).await;
    import_document(&repos, ImportDocument::from_yaml(INVENTORY).unwrap())
        .await
        .unwrap();
    sync.reload_pools().await.unwrap();
    sync.export_checkmk().await.unwrap();

    let shrunk = ImportDocument::from_yaml(
        r#"
folder_pools:
  - folder_name: pool_1
    folder_seats: 0
  - folder_name: pool_2
    folder_seats: 4
"#,
    )
    .unwrap();
    let report = import_document(&repos, shrunk).await.unwrap();

    assert_eq!(report.folder_pools, 1);
    assert_eq!(report.rejected.len(), 1);
    assert!(report.rejected[0].contains("pool_1"));

    let pools = repos.pools.list().await.unwrap();
    assert_eq!((pools[0].seat_capacity, pools[0].seats_taken), (1, 1));
    assert_eq!((pools[1].seat_capacity, pools[1].seats_taken), (4, 1));
}

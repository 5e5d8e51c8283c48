//! Common step definitions used across features

use cucumber::{given, then, when};

use crate::features::support::TestWorld;
use cmdb_syncer::models::{FolderPool, Host};

#[given(expr = "a host {string}")]
async fn a_host(world: &mut TestWorld, hostname: String) {
    world.add_host(Host::new(hostname)).await;
}

#[given(expr = "a host {string} with attribute {string} set to {string}")]
async fn a_host_with_attribute(world: &mut TestWorld, hostname: String, key: String, value: String) {
    let host = match world.repos.hosts.get(&hostname).await {
        Ok(existing) => existing.with_attribute(key, value),
        Err(_) => Host::new(hostname).with_attribute(key, value),
    };
    world.add_host(host).await;
}

#[given(expr = "a folder pool {string} with {int} seat(s)")]
async fn a_folder_pool(world: &mut TestWorld, name: String, seats: u32) {
    world
        .repos
        .pools
        .upsert(&FolderPool::new(name, seats))
        .await
        .expect("Failed to store pool");
}

#[when("I export to Checkmk")]
async fn export_to_checkmk(world: &mut TestWorld) {
    world.export().await;
}

#[then(expr = "host {string} is placed in folder {string}")]
async fn placed_in_folder(world: &mut TestWorld, hostname: String, folder: String) {
    let export = world
        .last_export()
        .exports
        .iter()
        .find(|e| e.hostname == hostname)
        .unwrap_or_else(|| panic!("Host {} was not exported", hostname));
    assert_eq!(export.outcome.move_folder.as_deref(), Some(folder.as_str()));
}

#[then(expr = "host {string} has no folder")]
async fn has_no_folder(world: &mut TestWorld, hostname: String) {
    let export = world
        .last_export()
        .exports
        .iter()
        .find(|e| e.hostname == hostname)
        .unwrap_or_else(|| panic!("Host {} was not exported", hostname));
    assert!(export.outcome.move_folder.is_none());
}

#[then(expr = "host {string} fails with {string}")]
async fn host_fails(world: &mut TestWorld, hostname: String, message: String) {
    let failure = world
        .last_export()
        .failures
        .iter()
        .find(|f| f.hostname == hostname)
        .unwrap_or_else(|| panic!("Host {} did not fail", hostname));
    assert!(
        failure.error.contains(&message),
        "unexpected error: {}",
        failure.error
    );
}

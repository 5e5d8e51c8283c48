//! Checkmk commands

use async_trait::async_trait;

use super::{hostname_arg, to_json, Command};
use crate::AppState;

/// Evaluate every host and commit pool assignments
pub struct CheckmkExportCommand;

#[async_trait]
impl Command for CheckmkExportCommand {
    fn name(&self) -> &'static str {
        "checkmk-export"
    }

    fn usage(&self) -> &'static str {
        ""
    }

    fn about(&self) -> &'static str {
        "Export all hosts to Checkmk"
    }

    async fn run(&self, state: &AppState, _args: &[String]) -> anyhow::Result<String> {
        let summary = state.sync.export_checkmk().await?;
        if !summary.failures.is_empty() {
            tracing::warn!("{} hosts could not be exported", summary.failures.len());
        }
        to_json(&summary)
    }
}

/// Dry run for one host, no pool seat is taken or released
pub struct CheckmkDebugCommand;

#[async_trait]
impl Command for CheckmkDebugCommand {
    fn name(&self) -> &'static str {
        "checkmk-debug"
    }

    fn usage(&self) -> &'static str {
        "<hostname>"
    }

    fn about(&self) -> &'static str {
        "Show matched rules and outcome of one host"
    }

    async fn run(&self, state: &AppState, args: &[String]) -> anyhow::Result<String> {
        let hostname = hostname_arg(args, self.usage())?;
        to_json(&state.sync.checkmk_debug(hostname).await?)
    }
}

pub struct CheckmkGroupsCommand;

#[async_trait]
impl Command for CheckmkGroupsCommand {
    fn name(&self) -> &'static str {
        "checkmk-groups"
    }

    fn usage(&self) -> &'static str {
        ""
    }

    fn about(&self) -> &'static str {
        "Show the host, contact and service groups derived from all hosts"
    }

    async fn run(&self, state: &AppState, _args: &[String]) -> anyhow::Result<String> {
        to_json(&state.sync.checkmk_groups().await?)
    }
}

pub struct CheckmkRulesetsCommand;

#[async_trait]
impl Command for CheckmkRulesetsCommand {
    fn name(&self) -> &'static str {
        "checkmk-rulesets"
    }

    fn usage(&self) -> &'static str {
        ""
    }

    fn about(&self) -> &'static str {
        "Show the Checkmk rulesets rendered for all hosts"
    }

    async fn run(&self, state: &AppState, _args: &[String]) -> anyhow::Result<String> {
        to_json(&state.sync.checkmk_rulesets().await?)
    }
}

//! YAML import command

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;

use super::{to_json, Command};
use crate::services::{import_document, ImportDocument};
use crate::AppState;

pub struct ImportCommand;

#[async_trait]
impl Command for ImportCommand {
    fn name(&self) -> &'static str {
        "import"
    }

    fn usage(&self) -> &'static str {
        "<file.yaml>"
    }

    fn about(&self) -> &'static str {
        "Import hosts, folder pools and rules from a YAML file"
    }

    async fn run(&self, state: &AppState, args: &[String]) -> anyhow::Result<String> {
        let path = args
            .first()
            .map(Path::new)
            .ok_or_else(|| anyhow::anyhow!("Missing file, usage: import {}", self.usage()))?;

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read import file {:?}", path))?;
        let document = ImportDocument::from_yaml(&contents)
            .with_context(|| format!("Failed to parse import file {:?}", path))?;

        let report = import_document(state.sync.repositories(), document).await?;
        state.sync.reload_pools().await?;
        to_json(&report)
    }
}

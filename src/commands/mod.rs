//! Command line commands
//!
//! Each command is a [`Command`] registered by name in a [`CommandRegistry`].
//! The registry is built once at startup and handed to the dispatcher in
//! `main`; commands print JSON and never write to the terminal themselves.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::utils::{AppError, AppResult};
use crate::AppState;

pub mod ansible;
pub mod checkmk;
pub mod import;
pub mod status;

pub use ansible::{AnsibleCommand, AnsibleDebugCommand};
pub use checkmk::{CheckmkDebugCommand, CheckmkExportCommand, CheckmkGroupsCommand, CheckmkRulesetsCommand};
pub use import::ImportCommand;
pub use status::{NetboxCommand, PoolsCommand, RunsCommand};

/// A named operation run against the application state
#[async_trait]
pub trait Command: Send + Sync {
    /// Name used on the command line
    fn name(&self) -> &'static str;

    /// Argument synopsis shown in the help text
    fn usage(&self) -> &'static str;

    /// One line description shown in the help text
    fn about(&self) -> &'static str;

    /// Run the command and return what should be printed
    async fn run(&self, state: &AppState, args: &[String]) -> anyhow::Result<String>;
}

/// Commands by name
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }

    /// Registry with every built-in command
    pub fn with_defaults() -> AppResult<Self> {
        let mut registry = Self::new();
        registry.register(ImportCommand)?;
        registry.register(CheckmkExportCommand)?;
        registry.register(CheckmkDebugCommand)?;
        registry.register(CheckmkGroupsCommand)?;
        registry.register(CheckmkRulesetsCommand)?;
        registry.register(AnsibleCommand)?;
        registry.register(AnsibleDebugCommand)?;
        registry.register(NetboxCommand)?;
        registry.register(PoolsCommand)?;
        registry.register(RunsCommand)?;
        Ok(registry)
    }

    /// Register a command. Fails if the name is already taken.
    pub fn register(&mut self, command: impl Command + 'static) -> AppResult<()> {
        let name = command.name();
        if self.commands.contains_key(name) {
            return Err(AppError::Config(format!("command '{}' is already registered", name)));
        }
        self.commands.insert(name, Arc::new(command));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    /// All commands, sorted by name
    pub fn commands(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run a command by name
    pub async fn dispatch(&self, state: &AppState, name: &str, args: &[String]) -> anyhow::Result<String> {
        let command = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown command '{}', see --help", name))?;
        tracing::debug!("Running command {} {:?}", name, args);
        command.run(state, args).await
    }

    /// Command section of the help text
    pub fn help(&self) -> String {
        self.commands()
            .map(|c| format!("    {:<18}{}\n    {:<18}  {} {}", c.name(), c.about(), "", c.name(), c.usage()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Pretty JSON used as the output of every command
pub(crate) fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// First positional argument, required
pub(crate) fn hostname_arg<'a>(args: &'a [String], usage: &str) -> anyhow::Result<&'a str> {
    args.iter()
        .map(String::as_str)
        .find(|a| !a.starts_with("--"))
        .ok_or_else(|| anyhow::anyhow!("Missing hostname, usage: {}", usage))
}

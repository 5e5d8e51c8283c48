//! Ansible dynamic inventory commands

use async_trait::async_trait;

use super::{hostname_arg, to_json, Command};
use crate::AppState;

/// Dynamic inventory in the format `ansible-inventory` expects
pub struct AnsibleCommand;

#[async_trait]
impl Command for AnsibleCommand {
    fn name(&self) -> &'static str {
        "ansible"
    }

    fn usage(&self) -> &'static str {
        "--list | --host <hostname>"
    }

    fn about(&self) -> &'static str {
        "Print the Ansible inventory or the variables of one host"
    }

    async fn run(&self, state: &AppState, args: &[String]) -> anyhow::Result<String> {
        match args.first().map(String::as_str) {
            Some("--list") => to_json(&state.sync.ansible_inventory().await?),
            Some("--host") => {
                let hostname = args
                    .get(1)
                    .ok_or_else(|| anyhow::anyhow!("Missing hostname, usage: {}", self.usage()))?;
                // ignored hosts still answer with an empty object
                let vars = state.sync.ansible_host(hostname).await?.unwrap_or_default();
                to_json(&vars)
            }
            _ => anyhow::bail!("usage: ansible {}", self.usage()),
        }
    }
}

pub struct AnsibleDebugCommand;

#[async_trait]
impl Command for AnsibleDebugCommand {
    fn name(&self) -> &'static str {
        "ansible-debug"
    }

    fn usage(&self) -> &'static str {
        "<hostname>"
    }

    fn about(&self) -> &'static str {
        "Show matched rules and variables of one host"
    }

    async fn run(&self, state: &AppState, args: &[String]) -> anyhow::Result<String> {
        let hostname = hostname_arg(args, self.usage())?;
        to_json(&state.sync.ansible_debug(hostname).await?)
    }
}

//! Checkmk export rules
//!
//! Evaluation never touches the folder pools. The accumulator produces a
//! [`CheckmkDraft`] that records where a pool folder goes in the folder path;
//! the caller turns the draft into a [`PoolDecision`], commits it once and
//! renders the final [`CheckmkOutcome`] with the resolved folder.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{CheckmkAction, CheckmkOutcome};
use crate::services::engine::{HostContext, OutcomeAccumulator};
use crate::utils::{AppError, AppResult};

const HOSTNAME_MACRO: &str = "{{hostname}}";

/// Normalize a folder path: leading `/`, no trailing `/`, lower case
pub fn format_folder_name(folder: &str) -> String {
    let mut formatted = if folder.starts_with('/') {
        folder.to_string()
    } else {
        format!("/{}", folder)
    };
    if formatted.ends_with('/') {
        formatted.pop();
    }
    formatted.to_lowercase()
}

/// One piece of the folder path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSegment {
    Path(String),
    /// Placeholder for the host's pool folder
    Pool,
}

/// Result of a pure evaluation pass over the Checkmk rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckmkDraft {
    pub segments: Vec<FolderSegment>,
    /// Set once a `folder_pool` action matched; `None` inside allows any pool
    pub pool_request: Option<Option<Vec<String>>>,
    pub outcome: CheckmkOutcome,
}

/// What has to happen to the host's pool seat after evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "folder", rename_all = "snake_case")]
pub enum PoolDecision {
    /// No pool rule matched and the host holds no seat
    Unchanged,
    /// Reuse the folder the host is locked to
    Keep(String),
    /// Take a seat, optionally restricted to the named pools
    Acquire(Option<Vec<String>>),
    /// No pool rule matched any more; give the seat back
    Release(String),
}

impl CheckmkDraft {
    pub fn wants_pool(&self) -> bool {
        self.pool_request.is_some()
    }

    /// Decide the pool transition for a host with the given lock
    pub fn pool_decision(&self, locked_folder: Option<&str>) -> PoolDecision {
        match (&self.pool_request, locked_folder) {
            (Some(_), Some(folder)) => PoolDecision::Keep(folder.to_string()),
            (Some(candidates), None) => PoolDecision::Acquire(candidates.clone()),
            (None, Some(folder)) => PoolDecision::Release(folder.to_string()),
            (None, None) => PoolDecision::Unchanged,
        }
    }

    /// Render the outcome with the host's pool folder, if any
    pub fn finish(self, pool_folder: Option<&str>) -> CheckmkOutcome {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                FolderSegment::Path(folder) => path.push_str(folder),
                FolderSegment::Pool => {
                    if let Some(folder) = pool_folder {
                        path.push_str(&format_folder_name(folder));
                    }
                }
            }
        }

        let mut outcome = self.outcome;
        outcome.move_folder = if path.is_empty() { None } else { Some(path) };
        outcome
    }
}

/// Split a `key:value` custom attribute, substituting the hostname macro
pub fn parse_custom_attribute(param: &str, hostname: &str) -> AppResult<(String, String)> {
    match param.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => Ok((
            key.trim().to_string(),
            value.replace(HOSTNAME_MACRO, hostname),
        )),
        _ => Err(AppError::MalformedOutcome(format!(
            "custom_attribute '{}' is not in key:value form",
            param
        ))),
    }
}

/// Parse a comma-separated pool list; empty means every pool
pub fn parse_pool_candidates(param: &str) -> Option<Vec<String>> {
    let names: Vec<String> = param
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

fn is_folder_value(value: &str) -> bool {
    !value.is_empty() && value != "null"
}

/// Accumulator for the Checkmk export rules
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckmkRules;

impl CheckmkRules {
    fn apply_action(&self, host: &HostContext, action: &CheckmkAction, draft: &mut CheckmkDraft) -> AppResult<()> {
        match action {
            CheckmkAction::MoveFolder(folder) => {
                draft.segments.push(FolderSegment::Path(format_folder_name(folder)));
            }
            CheckmkAction::ValueAsFolder(key) => match host.attribute(key) {
                Some(value) if is_folder_value(value) => {
                    tracing::debug!("value_as_folder: '{}' adds folder '{}'", key, value);
                    draft.segments.push(FolderSegment::Path(format_folder_name(value)));
                }
                Some(_) => tracing::debug!("value_as_folder: '{}' found but empty", key),
                None => {}
            },
            CheckmkAction::TagAsFolder(value) => {
                if is_folder_value(value) {
                    for (key, _) in host.attributes.iter().filter(|(_, v)| *v == value) {
                        tracing::debug!("tag_as_folder: '{}' adds folder '{}'", value, key);
                        draft.segments.push(FolderSegment::Path(format_folder_name(key)));
                    }
                }
            }
            CheckmkAction::FolderPool(param) => {
                draft.segments.push(FolderSegment::Pool);
                if draft.pool_request.is_none() {
                    draft.pool_request = Some(parse_pool_candidates(param));
                }
            }
            CheckmkAction::Attribute(name) => draft.outcome.attributes.push(name.clone()),
            CheckmkAction::CustomAttribute(param) => {
                let (key, value) = parse_custom_attribute(param, &host.hostname)?;
                if matches!(value.to_lowercase().as_str(), "none" | "false") {
                    draft.outcome.remove_attributes.push(key);
                } else {
                    draft.outcome.custom_attributes.push(BTreeMap::from([(key, value)]));
                }
            }
            CheckmkAction::CreateCluster(param) => {
                for node_key in param.split(',').map(str::trim).filter(|k| !k.is_empty()) {
                    match node_key.strip_suffix('*') {
                        Some(prefix) => draft.outcome.create_cluster.extend(
                            host.attributes
                                .iter()
                                .filter(|(k, _)| k.starts_with(prefix))
                                .map(|(_, v)| v.clone()),
                        ),
                        None => {
                            if let Some(node) = host.attribute(node_key).filter(|v| !v.is_empty()) {
                                draft.outcome.create_cluster.push(node.to_string());
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl OutcomeAccumulator for CheckmkRules {
    type Action = CheckmkAction;
    type Outcome = CheckmkDraft;

    fn initial(&self, _host: &HostContext) -> CheckmkDraft {
        CheckmkDraft::default()
    }

    fn apply(&self, host: &HostContext, actions: &[CheckmkAction], mut draft: CheckmkDraft) -> CheckmkDraft {
        for action in actions {
            if let Err(e) = self.apply_action(host, action, &mut draft) {
                tracing::warn!(
                    "Skipping {} outcome for host '{}': {}",
                    action.kind(),
                    host.hostname,
                    e
                );
            }
        }
        draft
    }
}

//! Outcome actions, one variant type per rule family

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::{AppError, AppResult};

/// Attribute filter actions (Checkmk, Ansible and Netbox filter rules)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FilterAction {
    /// Keep the named attribute; a trailing `*` keeps every key with that prefix
    WhitelistAttribute { attribute_name: String },
    /// Keep every attribute whose value starts with the given text
    WhitelistAttributeValue { attribute_name: String },
    /// Exclude the host from the export
    #[serde(alias = "ignore_hosts")]
    IgnoreHost,
}

/// Rename an attribute (label rewrite / attribute rewrite rules)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteAction {
    #[serde(alias = "old_label_name", alias = "old_attribute_name")]
    pub old_name: String,
    #[serde(alias = "new_label_name", alias = "new_attribute_name")]
    pub new_name: String,
}

/// Checkmk export actions
///
/// Stored as `{action, action_param}` pairs; an unknown `action` is rejected
/// when the rule is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCheckmkAction", into = "RawCheckmkAction")]
pub enum CheckmkAction {
    /// Append the given folder path
    MoveFolder(String),
    /// Append the value of the named attribute as folder
    ValueAsFolder(String),
    /// Append the key of the attribute holding the given value as folder
    TagAsFolder(String),
    /// Append a folder taken from the pools (comma-separated pool names, empty for all)
    FolderPool(String),
    /// Pass an attribute to the exporter
    Attribute(String),
    /// Set `key:value` as custom attribute, `{{hostname}}` is substituted
    CustomAttribute(String),
    /// Collect cluster nodes from the listed attribute keys (`prefix*` allowed)
    CreateCluster(String),
}

impl CheckmkAction {
    pub fn kind(&self) -> &'static str {
        match self {
            CheckmkAction::MoveFolder(_) => "move_folder",
            CheckmkAction::ValueAsFolder(_) => "value_as_folder",
            CheckmkAction::TagAsFolder(_) => "tag_as_folder",
            CheckmkAction::FolderPool(_) => "folder_pool",
            CheckmkAction::Attribute(_) => "attribute",
            CheckmkAction::CustomAttribute(_) => "custom_attribute",
            CheckmkAction::CreateCluster(_) => "create_cluster",
        }
    }

    pub fn param(&self) -> &str {
        match self {
            CheckmkAction::MoveFolder(p)
            | CheckmkAction::ValueAsFolder(p)
            | CheckmkAction::TagAsFolder(p)
            | CheckmkAction::FolderPool(p)
            | CheckmkAction::Attribute(p)
            | CheckmkAction::CustomAttribute(p)
            | CheckmkAction::CreateCluster(p) => p,
        }
    }
}

/// Storage shape of a Checkmk action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCheckmkAction {
    pub action: String,
    #[serde(default)]
    pub action_param: String,
}

impl TryFrom<RawCheckmkAction> for CheckmkAction {
    type Error = AppError;

    fn try_from(raw: RawCheckmkAction) -> Result<Self, Self::Error> {
        let param = raw.action_param;
        match raw.action.as_str() {
            "move_folder" => Ok(CheckmkAction::MoveFolder(param)),
            "value_as_folder" => Ok(CheckmkAction::ValueAsFolder(param)),
            "tag_as_folder" => Ok(CheckmkAction::TagAsFolder(param)),
            "folder_pool" => Ok(CheckmkAction::FolderPool(param)),
            "attribute" => Ok(CheckmkAction::Attribute(param)),
            "custom_attribute" => Ok(CheckmkAction::CustomAttribute(param)),
            "create_cluster" => Ok(CheckmkAction::CreateCluster(param)),
            other => Err(AppError::MalformedOutcome(format!(
                "unknown checkmk action '{}'",
                other
            ))),
        }
    }
}

impl From<CheckmkAction> for RawCheckmkAction {
    fn from(action: CheckmkAction) -> Self {
        Self {
            action: action.kind().to_string(),
            action_param: action.param().to_string(),
        }
    }
}

/// How a group action iterates over host attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForeachType {
    /// One group per attribute key whose value equals `foreach`
    Label,
    /// One group per value of the attribute key(s) named by `foreach`
    Value,
}

/// Checkmk group membership action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAction {
    /// Group kind, e.g. `contact_groups`
    pub group_name: String,
    pub foreach_type: ForeachType,
    #[serde(alias = "foreach_pattern")]
    pub foreach: String,
    /// Optional filter; the first capture group (or the whole match) becomes the group name
    #[serde(default, deserialize_with = "optional_group_pattern")]
    pub regex: Option<GroupPattern>,
}

/// Extraction pattern of a group action, compiled when the rule is decoded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupPattern(Regex);

impl GroupPattern {
    pub fn new(pattern: &str) -> AppResult<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| AppError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl PartialEq for GroupPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for GroupPattern {}

impl TryFrom<String> for GroupPattern {
    type Error = AppError;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::new(&pattern)
    }
}

impl From<GroupPattern> for String {
    fn from(pattern: GroupPattern) -> Self {
        pattern.as_str().to_string()
    }
}

/// An empty pattern means no filter
fn optional_group_pattern<'de, D>(deserializer: D) -> Result<Option<GroupPattern>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .filter(|pattern| !pattern.is_empty())
        .map(GroupPattern::try_from)
        .transpose()
        .map_err(serde::de::Error::custom)
}

/// Ansible custom variable action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVariableAction {
    pub attribute_name: String,
    pub attribute_value: String,
}

/// Checkmk ruleset action; collected per ruleset for the ruleset exporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetAction {
    pub ruleset: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub value_template: String,
    #[serde(default)]
    pub condition_label_template: String,
}

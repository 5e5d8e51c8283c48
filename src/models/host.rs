//! Host data model

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::hostname_validator;

/// A host record as kept in the CMDB
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Host {
    /// Hostname (unique identifier)
    #[validate(length(min = 1, max = 255), custom(function = "hostname_validator"))]
    pub hostname: String,

    /// Attributes collected from inventory sources
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    /// Labels imported from the source system
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Pool folder the host is locked to, if any
    #[serde(default)]
    pub locked_folder: Option<String>,
}

impl Host {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Folder the host is locked to
    pub fn get_folder(&self) -> Option<&str> {
        self.locked_folder.as_deref()
    }

    /// Lock the host to a pool folder, or clear the lock with `None`
    pub fn lock_to_folder(&mut self, folder: Option<String>) {
        self.locked_folder = folder;
    }

    /// The key/value pairs conditions and outcomes are evaluated against
    ///
    /// Labels form the base, attributes of the same key take precedence.
    pub fn match_attributes(&self) -> BTreeMap<String, String> {
        let mut merged = self.labels.clone();
        merged.extend(self.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

//! Folder pool data model

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::utils::validation::folder_name_validator;

/// A capacity-bounded folder hosts can be locked to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_seats"))]
pub struct FolderPool {
    /// Folder name (unique)
    #[validate(custom(function = "folder_name_validator"))]
    pub folder_name: String,

    /// Number of hosts the folder may hold
    #[serde(alias = "folder_seats")]
    pub seat_capacity: u32,

    /// Number of hosts currently locked to the folder
    #[serde(default, alias = "folder_seats_taken")]
    pub seats_taken: u32,

    /// Disabled pools are never handed out
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn validate_seats(pool: &FolderPool) -> Result<(), ValidationError> {
    if pool.seats_taken > pool.seat_capacity {
        return Err(ValidationError::new("seats_taken_exceeds_capacity"));
    }
    Ok(())
}

/// Allocation state of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolState {
    Free,
    Full,
    Disabled,
}

impl FolderPool {
    pub fn new(folder_name: impl Into<String>, seat_capacity: u32) -> Self {
        Self {
            folder_name: folder_name.into(),
            seat_capacity,
            seats_taken: 0,
            enabled: true,
        }
    }

    pub fn has_free_seat(&self) -> bool {
        self.seats_taken < self.seat_capacity
    }

    pub fn state(&self) -> PoolState {
        if !self.enabled {
            PoolState::Disabled
        } else if self.has_free_seat() {
            PoolState::Free
        } else {
            PoolState::Full
        }
    }
}

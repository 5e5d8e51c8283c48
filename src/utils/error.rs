//! Error types and handling
//!
//! Every fallible operation in the crate reports an [`AppError`]. Rule
//! evaluation itself never fails; errors come from rule definitions that do
//! not compile, from folder pool exhaustion, and from the storage layer.

use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Record not found (host, rule group, pool)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Condition operator name that is not part of the operator set
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// Condition pattern that cannot be compiled for its operator
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Every eligible folder pool is full
    #[error("No pool folder available for host {0}")]
    NoFolderAvailable(String),

    /// Outcome action whose parameter cannot be interpreted
    #[error("Malformed outcome: {0}")]
    MalformedOutcome(String),

    /// Validation of an imported record failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage backend error
    #[error("Database error: {0}")]
    Database(String),

    /// (De)serialization of a stored or imported document failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error only affects a single host of a batch run
    pub fn is_host_scoped(&self) -> bool {
        matches!(self, AppError::NoFolderAvailable(_) | AppError::NotFound(_))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(format!("Migration failed: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_norway::Error> for AppError {
    fn from(err: serde_norway::Error) -> Self {
        AppError::Serialization(format!("YAML error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias used across the crate
pub type AppResult<T> = Result<T, AppError>;

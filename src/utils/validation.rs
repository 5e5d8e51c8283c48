//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Regex for validating hostnames (FQDNs and short names)
static HOSTNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$").unwrap());

/// Regex for validating folder pool names (path segments separated by '/')
static FOLDER_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/?[a-zA-Z0-9_.-]+(/[a-zA-Z0-9_.-]+)*/?$").unwrap());

/// Validate a hostname
pub fn validate_hostname(hostname: &str) -> bool {
    !hostname.is_empty() && hostname.len() <= 255 && HOSTNAME_REGEX.is_match(hostname)
}

/// Validate a rule name
///
/// Rule names are free text shown in the admin UI, they only need to be
/// present and printable.
pub fn validate_rule_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && name.len() <= 255 && !name.chars().any(|c| c.is_control())
}

/// Validate a folder pool name
pub fn validate_folder_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 255 && FOLDER_NAME_REGEX.is_match(name)
}

/// `validator` adapter for hostnames
pub fn hostname_validator(hostname: &str) -> Result<(), ValidationError> {
    if validate_hostname(hostname) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_hostname"))
    }
}

/// `validator` adapter for rule names
pub fn rule_name_validator(name: &str) -> Result<(), ValidationError> {
    if validate_rule_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_rule_name"))
    }
}

/// `validator` adapter for folder pool names
pub fn folder_name_validator(name: &str) -> Result<(), ValidationError> {
    if validate_folder_name(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_folder_name"))
    }
}

//! Common test utilities and helpers
//!
//! This module provides shared test infrastructure including:
//! - Test fixtures (database, service setup)
//! - Factories for hosts, pools and rules

pub mod factories;
pub mod fixtures;

pub use factories::*;
pub use fixtures::*;

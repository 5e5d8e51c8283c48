//! Integration tests for CMDB Syncer
//!
//! These tests run the sync service and the repositories against an
//! in-memory SQLite database with all migrations applied.

mod import_tests;
mod store_tests;
mod sync_tests;

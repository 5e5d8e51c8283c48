//! Step definitions for Cucumber scenarios

pub mod checkmk_steps;
pub mod common_steps;
pub mod filter_steps;
pub mod pool_steps;

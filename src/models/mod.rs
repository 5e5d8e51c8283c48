//! Data models

mod action;
mod condition;
mod host;
mod log;
mod outcome;
mod pool;
mod rule;

pub use action::*;
pub use condition::*;
pub use host::*;
pub use log::*;
pub use outcome::*;
pub use pool::*;
pub use rule::*;

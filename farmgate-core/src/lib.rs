//! Farmgate Core - shared domain vocabulary
//!
//! Roles, catalogue queries, settings, errors and logging used by every Farmgate crate

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use catalog::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;

//! Type definitions for handlers
//!
//! Request and response bodies used by the handlers.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod common;

// Re-export all types for convenience
pub use accounts::*;
pub use cart::*;
pub use catalog::*;
pub use common::*;

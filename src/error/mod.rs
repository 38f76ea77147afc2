//! Error handling
//!
//! Defines error types and handling for OPFS handle resolution.

pub mod handlers;
pub mod types;

pub use types::*;

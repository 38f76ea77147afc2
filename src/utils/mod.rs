//! Utility functions
//!
//! Provides logging setup for native and browser hosts.

pub mod logging;

//! Utility modules for common functionality.
//!
//! Logging setup and the exit guard that restores the terminal.

pub mod guard;
pub mod logger;

//! Launching auxiliary desktop programs.
//!
//! This module starts the terminal emulator and browser offered by the
//! chat's action bar.

mod launcher;
pub use launcher::{LaunchTarget, Launcher};

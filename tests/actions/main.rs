//! Integration tests for the parley_actions crate.
//!
//! Tests for the action layer:
//! - The validate, execute, report contract
//! - Standard action scenarios
//! - Event chains

mod chains;
mod phases;
mod standard;

//! Integration tests for the parley_grammar crate.
//!
//! Tests for the matching pipeline:
//! - Pattern compilation and rule registration
//! - Matching and ranking against the standard rules
//! - Scope resolution and vocabulary gating
//! - Ranking and builder properties

mod matching;
mod properties;
mod scope;

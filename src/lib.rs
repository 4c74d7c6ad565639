//! Parley - Command resolution for interactive fiction
//!
//! This crate re-exports all layers of the Parley pipeline for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 4: parley_runtime   : Command engine, messages, tracing, REPL
//! Layer 3: parley_actions   : Validate/execute/report actions, event chains
//! Layer 2: parley_grammar   : Patterns, vocabulary, matching, scope
//! Layer 1: parley_world     : Entities, traits, containment, exits
//! Layer 0: parley_foundation: Core types (Value, EntityId, Error)
//! ```

pub use parley_actions as actions;
pub use parley_foundation as foundation;
pub use parley_grammar as grammar;
pub use parley_runtime as runtime;
pub use parley_world as world;

//! Cross-layer integration tests for Parley
//!
//! Full turns through the command engine, from raw input to rendered text.

mod rendering;
mod stories;
mod turns;

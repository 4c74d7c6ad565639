//! Core identifiers, values, and persistent collections for Parley.
//!
//! This crate provides:
//! - [`EntityId`] - Generational entity identifiers
//! - [`Value`] - Dynamic values for entity properties and event payloads
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod entity;
pub mod error;
pub mod value;

pub use collections::{LtMap, LtVec};
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind};
pub use value::Value;

/// Result type alias using Parley's error type.
pub type Result<T> = std::result::Result<T, Error>;

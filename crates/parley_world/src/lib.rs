//! In-memory world model for Parley.
//!
//! This crate provides:
//! - [`Entity`] - Named things with aliases, adjectives, properties and traits
//! - [`Trait`] / [`TraitType`] - Capability bundles (container, openable, lockable, ...)
//! - [`EntityStore`] - Generational entity allocation
//! - [`World`] - Mutable world state with cheap snapshots and a containment tree
//! - [`WorldModel`] - Read-only query interface used by grammar, scope and actions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod entity;
pub mod model;
pub mod store;
pub mod traits;
pub mod world;

pub use entity::{Entity, EntitySpec};
pub use model::WorldModel;
pub use store::EntityStore;
pub use traits::{Trait, TraitType};
pub use world::World;

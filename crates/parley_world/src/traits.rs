//! Capability bundles attached to entities.
//!
//! A trait says what an entity *can do*: hold things, be opened, be locked,
//! connect two rooms. Grammar scope filters and action validation both key off
//! [`TraitType`], the data-free tag of a [`Trait`].

use std::fmt;
use std::sync::Arc;

use parley_foundation::{EntityId, LtMap, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The tag of a trait, used for lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraitType {
    /// A location that can hold actors and objects.
    Room,
    /// Something that acts (the player, NPCs).
    Actor,
    /// Can hold things inside it.
    Container,
    /// Can hold things on top of it.
    Supporter,
    /// Can be opened and closed.
    Openable,
    /// Can be locked and unlocked.
    Lockable,
    /// Connects two rooms.
    Door,
    /// Fixed in place; cannot be taken.
    Scenery,
    /// Story-defined capability.
    Custom(Arc<str>),
}

impl fmt::Display for TraitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room => write!(f, "room"),
            Self::Actor => write!(f, "actor"),
            Self::Container => write!(f, "container"),
            Self::Supporter => write!(f, "supporter"),
            Self::Openable => write!(f, "openable"),
            Self::Lockable => write!(f, "lockable"),
            Self::Door => write!(f, "door"),
            Self::Scenery => write!(f, "scenery"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// A capability bundle with its data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Trait {
    /// A room, with exits keyed by direction name.
    Room {
        /// Direction (`"north"`, `"up"`, ...) to destination room or door.
        exits: LtMap<Arc<str>, EntityId>,
    },
    /// An actor.
    Actor {
        /// Whether this is the player character.
        is_player: bool,
    },
    /// A container.
    Container {
        /// Maximum number of direct contents, if limited.
        capacity: Option<usize>,
        /// Whether contents are visible while closed.
        transparent: bool,
    },
    /// A supporter.
    Supporter {
        /// Maximum number of items on top, if limited.
        capacity: Option<usize>,
    },
    /// Open/closed state.
    Openable {
        /// Current state.
        is_open: bool,
    },
    /// Lock state.
    Lockable {
        /// Current state.
        is_locked: bool,
        /// The key that operates this lock, if any.
        key: Option<EntityId>,
    },
    /// A door between two rooms.
    Door {
        /// The two rooms this door connects.
        rooms: (EntityId, EntityId),
    },
    /// Fixed in place.
    Scenery,
    /// Story-defined capability.
    Custom {
        /// Trait name.
        name: Arc<str>,
        /// Arbitrary payload.
        data: Value,
    },
}

impl Trait {
    /// Returns the tag for this trait.
    #[must_use]
    pub fn trait_type(&self) -> TraitType {
        match self {
            Self::Room { .. } => TraitType::Room,
            Self::Actor { .. } => TraitType::Actor,
            Self::Container { .. } => TraitType::Container,
            Self::Supporter { .. } => TraitType::Supporter,
            Self::Openable { .. } => TraitType::Openable,
            Self::Lockable { .. } => TraitType::Lockable,
            Self::Door { .. } => TraitType::Door,
            Self::Scenery => TraitType::Scenery,
            Self::Custom { name, .. } => TraitType::Custom(Arc::clone(name)),
        }
    }

    /// A room with no exits.
    #[must_use]
    pub fn room() -> Self {
        Self::Room {
            exits: LtMap::new(),
        }
    }

    /// An opaque container with unlimited capacity.
    #[must_use]
    pub const fn container() -> Self {
        Self::Container {
            capacity: None,
            transparent: false,
        }
    }

    /// An openable in the given state.
    #[must_use]
    pub const fn openable(is_open: bool) -> Self {
        Self::Openable { is_open }
    }

    /// A lockable in the given state, optionally tied to a key.
    #[must_use]
    pub const fn lockable(is_locked: bool, key: Option<EntityId>) -> Self {
        Self::Lockable { is_locked, key }
    }
}

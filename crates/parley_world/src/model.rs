//! Read-only query interface over world state.
//!
//! Grammar matching, scope resolution, action validation, reporting and event
//! chains all see the world through this trait. Only action execution holds a
//! mutable [`World`](crate::World).

use std::sync::Arc;

use parley_foundation::EntityId;

use crate::entity::Entity;
use crate::traits::{Trait, TraitType};

/// Read access to entities and the containment tree.
pub trait WorldModel {
    /// Gets an entity by id.
    fn entity(&self, id: EntityId) -> Option<&Entity>;

    /// Direct contents of an entity, in insertion order.
    fn contents(&self, id: EntityId) -> Vec<EntityId>;

    /// The entity directly holding `id`, if placed.
    fn location(&self, id: EntityId) -> Option<EntityId>;

    /// Every live entity, in allocation order.
    fn entities(&self) -> Vec<EntityId>;

    /// Number of live entities.
    fn entity_count(&self) -> usize;

    /// Returns true if the entity exists and has the trait.
    fn has_trait(&self, id: EntityId, trait_type: &TraitType) -> bool {
        self.entity(id).is_some_and(|e| e.has_trait(trait_type))
    }

    /// Gets trait data for an entity.
    fn get_trait(&self, id: EntityId, trait_type: &TraitType) -> Option<&Trait> {
        self.entity(id)?.get_trait(trait_type)
    }

    /// Display name, or an empty string for unknown ids.
    fn name_of(&self, id: EntityId) -> Arc<str> {
        self.entity(id)
            .map_or_else(|| Arc::from(""), |e| Arc::clone(&e.name))
    }

    /// Walks up the containment tree to the nearest room.
    ///
    /// A room is its own containing room.
    fn containing_room(&self, id: EntityId) -> Option<EntityId> {
        let mut current = id;
        // Bounded walk; the tree is acyclic but ids may be stale.
        for _ in 0..=self.entity_count() {
            if self.has_trait(current, &TraitType::Room) {
                return Some(current);
            }
            current = self.location(current)?;
        }
        None
    }

    /// Returns true if `ancestor` contains `id` at any depth.
    fn is_within(&self, id: EntityId, ancestor: EntityId) -> bool {
        let mut current = self.location(id);
        let mut steps = self.entity_count();
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            if steps == 0 {
                return false;
            }
            steps -= 1;
            current = self.location(parent);
        }
        false
    }

    /// Open state. Things without an openable trait count as open.
    fn is_open(&self, id: EntityId) -> bool {
        match self.get_trait(id, &TraitType::Openable) {
            Some(Trait::Openable { is_open }) => *is_open,
            _ => true,
        }
    }

    /// Lock state. Things without a lockable trait count as unlocked.
    fn is_locked(&self, id: EntityId) -> bool {
        matches!(
            self.get_trait(id, &TraitType::Lockable),
            Some(Trait::Lockable { is_locked: true, .. })
        )
    }

    /// Whether the contents of `id` can be seen from outside.
    fn reveals_contents(&self, id: EntityId) -> bool {
        if self.has_trait(id, &TraitType::Supporter) {
            return true;
        }
        match self.get_trait(id, &TraitType::Container) {
            Some(Trait::Container { transparent, .. }) => *transparent || self.is_open(id),
            _ => false,
        }
    }
}

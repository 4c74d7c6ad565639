//! Mutable world state with cheap snapshots.
//!
//! `World` owns the entity store and the containment tree. Every field is a
//! persistent structure, so `clone()` is a constant-time snapshot; action
//! execution mutates in place through `&mut World`.

use std::sync::Arc;

use parley_foundation::{EntityId, Error, LtMap, LtVec, Result, Value};
use tracing::trace;

use crate::entity::{Entity, EntitySpec};
use crate::model::WorldModel;
use crate::store::EntityStore;
use crate::traits::{Trait, TraitType};

/// The world: entities plus where each one is.
#[derive(Clone, Debug, Default)]
pub struct World {
    store: EntityStore,
    /// Child -> parent.
    locations: LtMap<EntityId, EntityId>,
    /// Parent -> children, insertion ordered.
    contents: LtMap<EntityId, LtVec<EntityId>>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id refers to a live entity.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.store.exists(id)
    }

    // --- Entity Operations ---

    /// Spawns an entity, optionally placing it inside `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if `location` is not a live entity.
    pub fn create_entity(&mut self, spec: EntitySpec, location: Option<EntityId>) -> Result<EntityId> {
        if let Some(parent) = location {
            self.store.validate(parent)?;
        }
        let id = self.store.spawn(spec);
        if let Some(parent) = location {
            self.attach(id, parent);
        }
        Ok(id)
    }

    /// Removes an entity. Its contents are left unplaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is stale or unknown.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Entity> {
        self.store.validate(id)?;
        self.detach(id);
        for child in self.contents(id) {
            self.locations = self.locations.remove(&child);
        }
        self.contents = self.contents.remove(&id);
        self.store.remove(id)
    }

    /// Finds the first entity called `name` (by name or alias).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.store
            .ids()
            .find(|id| self.store.get(*id).is_some_and(|e| e.is_called(name)))
    }

    // --- Containment ---

    /// Moves `id` into `destination`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMove` when the destination is the entity itself or lies
    /// inside it, and an entity error if either id is not live.
    pub fn move_entity(&mut self, id: EntityId, destination: EntityId) -> Result<()> {
        self.store.validate(id)?;
        self.store.validate(destination)?;
        if id == destination {
            return Err(Error::invalid_move(id, destination, "cannot contain itself"));
        }
        if self.is_within(destination, id) {
            return Err(Error::invalid_move(
                id,
                destination,
                "destination is inside the entity",
            ));
        }
        trace!(?id, ?destination, "moving entity");
        self.detach(id);
        self.attach(id, destination);
        Ok(())
    }

    fn attach(&mut self, id: EntityId, parent: EntityId) {
        self.locations = self.locations.insert(id, parent);
        let children = self
            .contents
            .get(&parent)
            .cloned()
            .unwrap_or_default()
            .push_back(id);
        self.contents = self.contents.insert(parent, children);
    }

    fn detach(&mut self, id: EntityId) {
        if let Some(parent) = self.locations.get(&id).copied() {
            if let Some(children) = self.contents.get(&parent) {
                let remaining = children.without(&id);
                self.contents = self.contents.insert(parent, remaining);
            }
            self.locations = self.locations.remove(&id);
        }
    }

    // --- Properties and Traits ---

    /// Sets a property on an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is stale or unknown.
    pub fn set_property(&mut self, id: EntityId, key: &str, value: impl Into<Value>) -> Result<()> {
        let entity = self.store.get_mut(id)?;
        entity.properties = entity.properties.insert(Arc::from(key), value.into());
        Ok(())
    }

    /// Adds or replaces a trait.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is stale or unknown.
    pub fn add_trait(&mut self, id: EntityId, value: Trait) -> Result<()> {
        self.store.get_mut(id)?.set_trait(value);
        Ok(())
    }

    /// Removes a trait if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is stale or unknown.
    pub fn remove_trait(&mut self, id: EntityId, trait_type: &TraitType) -> Result<()> {
        self.store.get_mut(id)?.remove_trait(trait_type);
        Ok(())
    }

    /// Applies `update` to an existing trait.
    ///
    /// # Errors
    ///
    /// Returns `TraitNotFound` if the entity lacks the trait.
    pub fn update_trait(
        &mut self,
        id: EntityId,
        trait_type: &TraitType,
        update: impl FnOnce(&mut Trait),
    ) -> Result<()> {
        let entity = self.store.get_mut(id)?;
        let mut value = entity
            .get_trait(trait_type)
            .cloned()
            .ok_or_else(|| Error::trait_not_found(id, trait_type.to_string()))?;
        update(&mut value);
        entity.set_trait(value);
        Ok(())
    }

    /// Sets the open state of an openable entity.
    ///
    /// # Errors
    ///
    /// Returns `TraitNotFound` if the entity is not openable.
    pub fn set_open(&mut self, id: EntityId, open: bool) -> Result<()> {
        self.update_trait(id, &TraitType::Openable, |t| {
            if let Trait::Openable { is_open } = t {
                *is_open = open;
            }
        })
    }

    /// Sets the lock state of a lockable entity.
    ///
    /// # Errors
    ///
    /// Returns `TraitNotFound` if the entity is not lockable.
    pub fn set_locked(&mut self, id: EntityId, locked: bool) -> Result<()> {
        self.update_trait(id, &TraitType::Lockable, |t| {
            if let Trait::Lockable { is_locked, .. } = t {
                *is_locked = locked;
            }
        })
    }

    /// Adds an exit from `room` in `direction`.
    ///
    /// # Errors
    ///
    /// Returns `TraitNotFound` if `room` is not a room.
    pub fn connect(&mut self, room: EntityId, direction: &str, destination: EntityId) -> Result<()> {
        self.store.validate(destination)?;
        self.update_trait(room, &TraitType::Room, |t| {
            if let Trait::Room { exits } = t {
                *exits = exits.insert(Arc::from(direction), destination);
            }
        })
    }
}

impl WorldModel for World {
    fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    fn contents(&self, id: EntityId) -> Vec<EntityId> {
        self.contents
            .get(&id)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default()
    }

    fn location(&self, id: EntityId) -> Option<EntityId> {
        self.locations.get(&id).copied()
    }

    fn entities(&self) -> Vec<EntityId> {
        self.store.ids().collect()
    }

    fn entity_count(&self) -> usize {
        self.store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_foundation::ErrorKind;

    fn cellar() -> (World, EntityId, EntityId, EntityId) {
        let mut world = World::new();
        let room = world
            .create_entity(EntitySpec::new("cellar").with_trait(Trait::room()), None)
            .unwrap();
        let chest = world
            .create_entity(
                EntitySpec::new("chest")
                    .with_trait(Trait::container())
                    .with_trait(Trait::openable(false)),
                Some(room),
            )
            .unwrap();
        let coin = world.create_entity(EntitySpec::new("coin"), Some(chest)).unwrap();
        (world, room, chest, coin)
    }

    #[test]
    fn create_places_in_location() {
        let (world, room, chest, coin) = cellar();
        assert_eq!(world.location(chest), Some(room));
        assert_eq!(world.contents(chest), vec![coin]);
        assert_eq!(world.containing_room(coin), Some(room));
        assert!(world.is_within(coin, room));
    }

    #[test]
    fn deep_nesting_walks_within_entity_count() {
        let (mut world, room, _chest, coin) = cellar();
        let mut innermost = coin;
        for _ in 0..8 {
            innermost = world
                .create_entity(EntitySpec::new("pouch"), Some(innermost))
                .unwrap();
        }
        assert_eq!(world.entity_count(), 11);
        assert_eq!(world.containing_room(innermost), Some(room));
        assert!(world.is_within(innermost, room));
        assert!(!world.is_within(room, innermost));

        world.remove_entity(innermost).unwrap();
        assert_eq!(world.entity_count(), 10);
        assert_eq!(world.entity_count(), world.entities().len());
    }

    #[test]
    fn move_preserves_insertion_order() {
        let (mut world, room, chest, coin) = cellar();
        let gem = world.create_entity(EntitySpec::new("gem"), Some(room)).unwrap();
        world.move_entity(gem, chest).unwrap();
        assert_eq!(world.contents(chest), vec![coin, gem]);
        assert_eq!(world.contents(room), vec![chest]);
    }

    #[test]
    fn move_into_own_contents_is_rejected() {
        let (mut world, _room, chest, coin) = cellar();
        let err = world.move_entity(chest, coin).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidMove { .. }));
        let err = world.move_entity(chest, chest).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidMove { .. }));
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let (mut world, room, chest, coin) = cellar();
        let before = world.clone();
        world.set_open(chest, true).unwrap();
        world.move_entity(coin, room).unwrap();

        assert!(!before.is_open(chest));
        assert!(world.is_open(chest));
        assert_eq!(before.location(coin), Some(chest));
    }

    #[test]
    fn update_missing_trait_fails() {
        let (mut world, _room, _chest, coin) = cellar();
        let err = world.set_locked(coin, true).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TraitNotFound { .. }));
    }

    #[test]
    fn remove_unplaces_contents() {
        let (mut world, _room, chest, coin) = cellar();
        world.remove_entity(chest).unwrap();
        assert!(!world.exists(chest));
        assert_eq!(world.location(coin), None);
    }

    #[test]
    fn reveals_contents_follows_open_and_transparent() {
        let (mut world, room, chest, _coin) = cellar();
        assert!(!world.reveals_contents(chest));
        world.set_open(chest, true).unwrap();
        assert!(world.reveals_contents(chest));

        let jar = world
            .create_entity(
                EntitySpec::new("jar")
                    .with_trait(Trait::Container {
                        capacity: None,
                        transparent: true,
                    })
                    .with_trait(Trait::openable(false)),
                Some(room),
            )
            .unwrap();
        assert!(world.reveals_contents(jar));
    }

    #[test]
    fn find_by_name_checks_aliases() {
        let mut world = World::new();
        let lamp = world
            .create_entity(EntitySpec::new("brass lamp").with_alias("lantern"), None)
            .unwrap();
        assert_eq!(world.find_by_name("lantern"), Some(lamp));
        assert_eq!(world.find_by_name("Brass Lamp"), Some(lamp));
        assert_eq!(world.find_by_name("sword"), None);
    }
}

//! Entity allocation with generational indices.
//!
//! The `EntityStore` owns every entity record. Slots are reused through a
//! free list; each reuse bumps the slot's generation so that ids held by a
//! previous turn's command fail validation instead of naming a new entity.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use parley_foundation::{EntityId, Error, Result};

use crate::entity::{Entity, EntitySpec};

#[derive(Clone, Debug)]
struct Slot {
    /// Odd generations are live, even generations are free.
    generation: u32,
    entity: Option<Entity>,
}

/// Generational storage for entity records.
///
/// Backed by persistent vectors, so cloning the store is O(1).
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    slots: im::Vector<Slot>,
    free_list: im::Vector<u64>,
    live_count: usize,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an id and stores the entity described by `spec`.
    pub fn spawn(&mut self, spec: EntitySpec) -> EntityId {
        self.live_count += 1;

        let id = if let Some(index) = self.free_list.pop_back() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            EntityId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u64;
            self.slots.push_back(Slot {
                generation: 1,
                entity: None,
            });
            EntityId::new(index, 1)
        };

        self.slots[id.index as usize].entity = Some(spec.into_entity(id));
        id
    }

    /// Removes an entity, freeing its slot for reuse.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or was never allocated.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity> {
        self.validate(id)?;
        let slot = &mut self.slots[id.index as usize];
        slot.generation += 1;
        let entity = slot.entity.take().ok_or_else(|| Error::entity_not_found(id))?;
        self.free_list.push_back(id.index);
        self.live_count -= 1;
        Ok(entity)
    }

    /// Validates that an id refers to a live entity.
    ///
    /// # Errors
    ///
    /// Returns `StaleEntity` for a reused slot and `EntityNotFound` otherwise.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        let Some(slot) = self.slots.get(id.index as usize) else {
            return Err(Error::entity_not_found(id));
        };
        if slot.generation != id.generation {
            return Err(Error::stale_entity(id));
        }
        if slot.generation % 2 == 0 {
            return Err(Error::entity_not_found(id));
        }
        Ok(())
    }

    /// Returns true if the id refers to a live entity.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.validate(id).is_ok()
    }

    /// Gets a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        (slot.generation == id.generation)
            .then_some(slot.entity.as_ref())
            .flatten()
    }

    /// Gets a live entity for mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is stale or unknown.
    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.validate(id)?;
        self.slots[id.index as usize]
            .entity
            .as_mut()
            .ok_or_else(|| Error::entity_not_found(id))
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Iterates live ids in allocation-index order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.entity
                .as_ref()
                .map(|_| EntityId::new(idx as u64, slot.generation))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_foundation::ErrorKind;

    #[test]
    fn spawn_assigns_sequential_indices() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntitySpec::new("apple"));
        let b = store.spawn(EntitySpec::new("banana"));

        assert_eq!(a, EntityId::new(0, 1));
        assert_eq!(b, EntityId::new(1, 1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b).map(|e| &*e.name), Some("banana"));
    }

    #[test]
    fn removed_slot_is_reused_with_new_generation() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntitySpec::new("apple"));
        store.remove(a).unwrap();
        let c = store.spawn(EntitySpec::new("cherry"));

        assert_eq!(c.index, a.index);
        assert_eq!(c.generation, 3);
        assert!(store.get(a).is_none());
        assert!(matches!(
            store.validate(a).unwrap_err().kind,
            ErrorKind::StaleEntity(_)
        ));
    }

    #[test]
    fn double_remove_fails() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntitySpec::new("apple"));
        store.remove(a).unwrap();
        assert!(store.remove(a).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn clone_is_an_independent_snapshot() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntitySpec::new("apple"));
        let snapshot = store.clone();
        store.get_mut(a).unwrap().name = "pear".into();

        assert_eq!(snapshot.get(a).map(|e| &*e.name), Some("apple"));
        assert_eq!(store.get(a).map(|e| &*e.name), Some("pear"));
    }

    #[test]
    fn ids_skip_free_slots() {
        let mut store = EntityStore::new();
        let a = store.spawn(EntitySpec::new("a"));
        let b = store.spawn(EntitySpec::new("b"));
        store.remove(a).unwrap();
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![b]);
    }
}

//! What an action sees while it runs.

use std::collections::BTreeMap;

use parley_foundation::{EntityId, Value};
use parley_world::{Entity, World, WorldModel};

use crate::command::ResolvedCommand;
use crate::event::{EventDraft, EventFactory, SemanticEvent};

/// Per-run context handed to every phase of an action.
///
/// `validate` and `report` get `&ActionContext` and can only read the world;
/// `execute` gets `&mut ActionContext` and is the single writer. Data that
/// `report` needs from before the mutation goes through [`stash`](Self::stash).
pub struct ActionContext<'a> {
    world: &'a mut World,
    /// The command being run.
    pub command: &'a ResolvedCommand,
    factory: &'a EventFactory,
    shared: BTreeMap<String, Value>,
}

impl<'a> ActionContext<'a> {
    /// Creates a context.
    pub fn new(
        world: &'a mut World,
        command: &'a ResolvedCommand,
        factory: &'a EventFactory,
    ) -> Self {
        Self {
            world,
            command,
            factory,
            shared: BTreeMap::new(),
        }
    }

    /// Read access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &*self.world
    }

    /// Write access to the world. Only `execute` holds `&mut self`.
    pub fn world_mut(&mut self) -> &mut World {
        &mut *self.world
    }

    /// The acting entity.
    #[must_use]
    pub fn actor(&self) -> EntityId {
        self.command.actor
    }

    /// The direct object, if it still exists.
    #[must_use]
    pub fn direct_object(&self) -> Option<&Entity> {
        self.command.direct_object.and_then(|id| self.world.entity(id))
    }

    /// The indirect object, if it still exists.
    #[must_use]
    pub fn indirect_object(&self) -> Option<&Entity> {
        self.command
            .indirect_object
            .and_then(|id| self.world.entity(id))
    }

    /// The instrument, if it still exists.
    #[must_use]
    pub fn instrument(&self) -> Option<&Entity> {
        self.command.instrument.and_then(|id| self.world.entity(id))
    }

    /// The actor's room.
    #[must_use]
    pub fn room(&self) -> Option<EntityId> {
        self.world.containing_room(self.command.actor)
    }

    /// Stores data for `report`.
    pub fn stash(&mut self, key: &str, value: impl Into<Value>) {
        self.shared.insert(key.to_string(), value.into());
    }

    /// Reads stashed data.
    #[must_use]
    pub fn stashed(&self, key: &str) -> Option<&Value> {
        self.shared.get(key)
    }

    /// Stashed boolean, false when absent.
    #[must_use]
    pub fn stashed_flag(&self, key: &str) -> bool {
        self.stashed(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Stamps a draft.
    #[must_use]
    pub fn emit(&self, draft: EventDraft) -> SemanticEvent {
        self.factory.create(draft)
    }

    /// The turn number.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.factory.turn()
    }
}

impl std::fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("command", &self.command)
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

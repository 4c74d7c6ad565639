//! Read-only context handed to matching, scope filters and vocabulary gates.

use std::collections::BTreeMap;

use parley_foundation::EntityId;
use parley_world::WorldModel;

use crate::pronouns::PronounState;

/// What the grammar layer can see while matching one command.
#[derive(Clone)]
pub struct GrammarContext<'a> {
    /// World state, read only.
    pub world: &'a dyn WorldModel,
    /// The acting entity (usually the player).
    pub actor: EntityId,
    /// The actor's containing room, if any.
    pub location: Option<EntityId>,
    /// Entities bound to slots matched so far in the current rule.
    pub slots: BTreeMap<String, Vec<EntityId>>,
    /// Pronoun referents from earlier turns.
    pub pronouns: Option<&'a PronounState>,
}

impl<'a> GrammarContext<'a> {
    /// Creates a context for `actor`, deriving the location from the world.
    #[must_use]
    pub fn new(world: &'a dyn WorldModel, actor: EntityId) -> Self {
        Self {
            world,
            actor,
            location: world.containing_room(actor),
            slots: BTreeMap::new(),
            pronouns: None,
        }
    }

    /// Attaches pronoun state.
    #[must_use]
    pub fn with_pronouns(mut self, pronouns: &'a PronounState) -> Self {
        self.pronouns = Some(pronouns);
        self
    }

    /// First entity bound to a slot matched earlier in this rule.
    #[must_use]
    pub fn slot_entity(&self, name: &str) -> Option<EntityId> {
        self.slots.get(name).and_then(|ids| ids.first().copied())
    }
}

impl std::fmt::Debug for GrammarContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrammarContext")
            .field("actor", &self.actor)
            .field("location", &self.location)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

//! A command after grammar matching and scope resolution.

use std::collections::BTreeMap;

use parley_foundation::EntityId;
use parley_grammar::{PatternMatch, SemanticProperties, SlotMatch, SlotType, TypedSlotValue};

/// What an action runs against: one actor, at most one object per role.
///
/// Multi-object commands ("take all") become one `ResolvedCommand` per
/// entity; see [`ResolvedCommand::expand`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCommand {
    /// Target action id.
    pub action: String,
    /// Who is acting.
    pub actor: EntityId,
    /// The verb as typed.
    pub verb: Option<String>,
    /// The preposition as typed.
    pub preposition: Option<String>,
    /// First entity slot.
    pub direct_object: Option<EntityId>,
    /// Second entity slot.
    pub indirect_object: Option<EntityId>,
    /// Instrument slot.
    pub instrument: Option<EntityId>,
    /// Every slot, by name.
    pub slots: BTreeMap<String, SlotMatch>,
    /// Derived semantics.
    pub semantics: SemanticProperties,
    /// Raw input.
    pub input: String,
}

impl ResolvedCommand {
    /// A command with no objects.
    #[must_use]
    pub fn new(action: impl Into<String>, actor: EntityId) -> Self {
        Self {
            action: action.into(),
            actor,
            verb: None,
            preposition: None,
            direct_object: None,
            indirect_object: None,
            instrument: None,
            slots: BTreeMap::new(),
            semantics: SemanticProperties::default(),
            input: String::new(),
        }
    }

    /// Sets the direct object.
    #[must_use]
    pub fn with_direct_object(mut self, id: EntityId) -> Self {
        self.direct_object = Some(id);
        self
    }

    /// Sets the indirect object.
    #[must_use]
    pub fn with_indirect_object(mut self, id: EntityId) -> Self {
        self.indirect_object = Some(id);
        self
    }

    /// Sets the instrument.
    #[must_use]
    pub fn with_instrument(mut self, id: EntityId) -> Self {
        self.instrument = Some(id);
        self
    }

    /// Sets the verb.
    #[must_use]
    pub fn with_verb(mut self, verb: impl Into<String>) -> Self {
        self.verb = Some(verb.into());
        self
    }

    /// Sets the semantics.
    #[must_use]
    pub fn with_semantics(mut self, semantics: SemanticProperties) -> Self {
        self.semantics = semantics;
        self
    }

    /// Adds a slot.
    #[must_use]
    pub fn with_slot(mut self, name: impl Into<String>, slot: SlotMatch) -> Self {
        self.slots.insert(name.into(), slot);
        self
    }

    /// Builds commands from a grammar match, one per object of a
    /// multi-object slot.
    ///
    /// Entity slots are assigned in pattern order: the first becomes the
    /// direct object, the second the indirect object. Instrument slots fill
    /// `instrument`. Only the first multi-object slot is expanded; any later
    /// one contributes its first entity.
    #[must_use]
    pub fn expand(matched: &PatternMatch, actor: EntityId, input: &str) -> Vec<Self> {
        let mut base = Self::new(matched.action(), actor);
        base.verb.clone_from(&matched.matched.verb);
        base.preposition.clone_from(&matched.matched.preposition);
        base.slots.clone_from(&matched.slots);
        base.semantics = matched.semantics.clone();
        base.input = input.to_string();

        let mut ordered: Vec<(&String, &SlotMatch)> = matched.slots.iter().collect();
        ordered.sort_by_key(|(name, _)| matched.rule.compiled.slots.get(*name).copied());

        let mut multi: Option<(usize, Vec<EntityId>)> = None;
        let mut position = 0;
        for (_, slot) in ordered {
            if slot.slot_type == SlotType::Instrument {
                base.instrument = slot.entity();
                continue;
            }
            if !slot.slot_type.is_entity() {
                continue;
            }
            if multi.is_none() && slot.entities.len() > 1 {
                multi = Some((position, slot.entities.clone()));
            }
            match position {
                0 => base.direct_object = slot.entity(),
                1 => base.indirect_object = slot.entity(),
                _ => {}
            }
            position += 1;
        }

        match multi {
            None => vec![base],
            Some((role, entities)) => entities
                .into_iter()
                .map(|id| {
                    let mut command = base.clone();
                    if role == 0 {
                        command.direct_object = Some(id);
                    } else {
                        command.indirect_object = Some(id);
                    }
                    command
                })
                .collect(),
        }
    }

    /// Looks up a slot.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&SlotMatch> {
        self.slots.get(name)
    }

    /// The first typed value among the slots matching `pick`.
    pub fn value<T>(&self, pick: impl Fn(&TypedSlotValue) -> Option<T>) -> Option<T> {
        self.slots
            .values()
            .filter_map(|s| s.value.as_ref())
            .find_map(pick)
    }

    /// The direction of a movement command, from a direction slot or the
    /// derived semantics.
    #[must_use]
    pub fn direction(&self) -> Option<String> {
        self.value(|v| match v {
            TypedSlotValue::Direction(d) => Some(d.clone()),
            _ => None,
        })
        .or_else(|| self.semantics.direction.clone())
    }

    /// Entities removed by "all but".
    #[must_use]
    pub fn excluded(&self) -> Vec<EntityId> {
        self.slots
            .values()
            .flat_map(|s| s.excluded.iter().copied())
            .collect()
    }

    /// Returns true if any slot was an "all" phrase.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.slots.values().any(|s| s.is_all)
    }
}

//! Entity records and the spec used to spawn them.

use std::sync::Arc;

use parley_foundation::{EntityId, LtMap, LtVec, Value};

use crate::traits::{Trait, TraitType};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A thing in the world: room, actor, object or door.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entity {
    /// Identifier.
    pub id: EntityId,
    /// Primary name ("brass lamp").
    pub name: Arc<str>,
    /// Alternative nouns ("lantern").
    pub aliases: LtVec<Arc<str>>,
    /// Adjectives that may qualify the name ("brass", "old").
    pub adjectives: LtVec<Arc<str>>,
    /// Free-form properties used by story filters.
    pub properties: LtMap<Arc<str>, Value>,
    traits: LtMap<TraitType, Trait>,
}

impl Entity {
    /// Returns true if the entity carries the trait.
    #[must_use]
    pub fn has_trait(&self, trait_type: &TraitType) -> bool {
        self.traits.contains_key(trait_type)
    }

    /// Returns the trait data, if present.
    #[must_use]
    pub fn get_trait(&self, trait_type: &TraitType) -> Option<&Trait> {
        self.traits.get(trait_type)
    }

    /// Iterates the entity's traits in tag order.
    pub fn traits(&self) -> impl Iterator<Item = &Trait> {
        self.traits.values()
    }

    /// Looks up a property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub(crate) fn set_trait(&mut self, value: Trait) {
        self.traits = self.traits.insert(value.trait_type(), value);
    }

    pub(crate) fn remove_trait(&mut self, trait_type: &TraitType) {
        self.traits = self.traits.remove(trait_type);
    }

    /// Returns true if `word` names this entity by name or alias, ignoring case.
    #[must_use]
    pub fn is_called(&self, word: &str) -> bool {
        self.name.eq_ignore_ascii_case(word)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(word))
    }

    /// Snapshot of the entity for event payloads.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let traits: Vec<Value> = self
            .traits
            .keys()
            .map(|t| Value::from(t.to_string()))
            .collect();
        Value::map()
            .with("id", self.id)
            .with("name", Arc::clone(&self.name))
            .with("traits", Value::Vec(traits.into_iter().collect()))
            .with("properties", Value::Map(self.properties.clone()))
    }
}

/// Description of an entity to spawn.
#[derive(Clone, Debug, Default)]
pub struct EntitySpec {
    name: String,
    aliases: Vec<String>,
    adjectives: Vec<String>,
    properties: Vec<(String, Value)>,
    traits: Vec<Trait>,
}

impl EntitySpec {
    /// Starts a spec with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds an adjective.
    #[must_use]
    pub fn with_adjective(mut self, adjective: impl Into<String>) -> Self {
        self.adjectives.push(adjective.into());
        self
    }

    /// Sets a property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Adds a trait.
    #[must_use]
    pub fn with_trait(mut self, value: Trait) -> Self {
        self.traits.push(value);
        self
    }

    pub(crate) fn into_entity(self, id: EntityId) -> Entity {
        let lower = |s: String| -> Arc<str> { Arc::from(s.to_lowercase()) };
        let mut entity = Entity {
            id,
            name: Arc::from(self.name),
            aliases: self.aliases.into_iter().map(lower).collect(),
            adjectives: self.adjectives.into_iter().map(lower).collect(),
            properties: self
                .properties
                .into_iter()
                .map(|(k, v)| (Arc::from(k), v))
                .collect(),
            traits: LtMap::new(),
        };
        for value in self.traits {
            entity.set_trait(value);
        }
        entity
    }
}

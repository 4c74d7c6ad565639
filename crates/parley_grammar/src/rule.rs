//! Grammar rules and the builder used to define them.
//!
//! ```text
//! GrammarRule::define("put|place :item in|into|inside :container")
//!     .where_scope("item", |s| { s.carried(); })
//!     .where_scope("container", |s| { s.touchable().has_trait(TraitType::Container); })
//!     .maps_to("if.action.putting")
//!     .with_priority(110)
//!     .build()?
//! ```

use std::collections::BTreeMap;

use parley_foundation::{Error, ErrorKind, Result, Value};

use crate::pattern::{CompiledPattern, PatternCompiler, SlotType};
use crate::scope::{ScopeConstraint, ScopeConstraintBuilder};

/// Default rule priority.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Properties derived from the words a command used.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SemanticProperties {
    /// How the action is done ("careful", "forceful").
    pub manner: Option<String>,
    /// Spatial relation implied by a preposition ("in", "on").
    pub spatial_relation: Option<String>,
    /// Canonical direction.
    pub direction: Option<String>,
    /// Story-defined extras.
    pub extra: BTreeMap<String, Value>,
}

impl SemanticProperties {
    /// Creates empty semantics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the manner.
    #[must_use]
    pub fn with_manner(mut self, manner: impl Into<String>) -> Self {
        self.manner = Some(manner.into());
        self
    }

    /// Sets the spatial relation.
    #[must_use]
    pub fn with_spatial_relation(mut self, relation: impl Into<String>) -> Self {
        self.spatial_relation = Some(relation.into());
        self
    }

    /// Sets the direction.
    #[must_use]
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// Sets an extra property.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Overlays `other`; its set fields win.
    pub fn merge(&mut self, other: &Self) {
        if other.manner.is_some() {
            self.manner.clone_from(&other.manner);
        }
        if other.spatial_relation.is_some() {
            self.spatial_relation.clone_from(&other.spatial_relation);
        }
        if other.direction.is_some() {
            self.direction.clone_from(&other.direction);
        }
        for (k, v) in &other.extra {
            self.extra.insert(k.clone(), v.clone());
        }
    }

    /// Returns true if nothing is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.manner.is_none()
            && self.spatial_relation.is_none()
            && self.direction.is_none()
            && self.extra.is_empty()
    }

    /// Converts to a map value for event payloads.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut value = Value::map();
        if let Some(m) = &self.manner {
            value = value.with("manner", m.as_str());
        }
        if let Some(r) = &self.spatial_relation {
            value = value.with("spatialRelation", r.as_str());
        }
        if let Some(d) = &self.direction {
            value = value.with("direction", d.as_str());
        }
        for (k, v) in &self.extra {
            value = value.with(k, v.clone());
        }
        value
    }
}

/// Word-keyed semantic lookups for a rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SemanticMapping {
    /// Matched verb word to properties ("shove" → forceful).
    pub verbs: BTreeMap<String, SemanticProperties>,
    /// Matched preposition to spatial relation ("into" → "in").
    pub prepositions: BTreeMap<String, String>,
    /// Matched direction word to canonical direction.
    pub directions: BTreeMap<String, String>,
}

/// Type and scope for one slot.
#[derive(Clone, Debug)]
pub struct SlotSpec {
    /// What the slot accepts.
    pub slot_type: SlotType,
    /// Scope for entity slots; `None` means visible.
    pub constraint: Option<ScopeConstraint>,
}

/// A registered grammar rule. Immutable once registered.
#[derive(Clone, Debug)]
pub struct GrammarRule {
    /// Identity; re-registering a key replaces the rule.
    pub key: Option<String>,
    /// Pattern source.
    pub pattern: String,
    /// Compiled pattern.
    pub compiled: CompiledPattern,
    /// Spec for every slot in the pattern.
    pub slots: BTreeMap<String, SlotSpec>,
    /// Target action id.
    pub action: String,
    /// Higher wins.
    pub priority: i32,
    /// Word-keyed semantics.
    pub semantics: Option<SemanticMapping>,
    /// Semantics applied before word lookups.
    pub default_semantics: Option<SemanticProperties>,
    /// Registration order, set by the rule set.
    pub sequence: u64,
}

impl GrammarRule {
    /// Starts a rule for `pattern`.
    #[must_use]
    pub fn define(pattern: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(pattern)
    }

    /// Key if set, otherwise `action#sequence`.
    #[must_use]
    pub fn id(&self) -> String {
        self.key
            .clone()
            .unwrap_or_else(|| format!("{}#{}", self.action, self.sequence))
    }

    /// Type of a slot.
    #[must_use]
    pub fn slot_type(&self, name: &str) -> Option<&SlotType> {
        self.slots.get(name).map(|s| &s.slot_type)
    }

    /// Scope constraint of a slot, if set.
    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&ScopeConstraint> {
        self.slots.get(name).and_then(|s| s.constraint.as_ref())
    }

    /// Semantics for the words a match used.
    #[must_use]
    pub fn derive_semantics(
        &self,
        verb: Option<&str>,
        preposition: Option<&str>,
        direction: Option<&str>,
    ) -> SemanticProperties {
        let mut props = self.default_semantics.clone().unwrap_or_default();
        let Some(mapping) = &self.semantics else {
            return props;
        };
        if let Some(extra) = verb.and_then(|v| mapping.verbs.get(v)) {
            props.merge(extra);
        }
        if let Some(dir) = direction.and_then(|d| mapping.directions.get(d)) {
            props.direction = Some(dir.clone());
        }
        if let Some(relation) = preposition.and_then(|p| mapping.prepositions.get(p)) {
            props.spatial_relation = Some(relation.clone());
        }
        props
    }
}

#[derive(Clone, Debug, Default)]
struct PendingSlot {
    slot_type: Option<SlotType>,
    constraint: Option<ScopeConstraint>,
}

/// Builds a [`GrammarRule`].
#[derive(Clone, Debug)]
pub struct RuleBuilder {
    pattern: String,
    key: Option<String>,
    action: Option<String>,
    priority: i32,
    slots: BTreeMap<String, PendingSlot>,
    semantics: Option<SemanticMapping>,
    default_semantics: Option<SemanticProperties>,
}

impl RuleBuilder {
    /// Starts a rule for `pattern`.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            key: None,
            action: None,
            priority: DEFAULT_PRIORITY,
            slots: BTreeMap::new(),
            semantics: None,
            default_semantics: None,
        }
    }

    fn slot(mut self, name: &str, slot_type: SlotType) -> Self {
        self.slots.entry(name.to_string()).or_default().slot_type = Some(slot_type);
        self
    }

    /// Sets the scope of an entity slot.
    #[must_use]
    pub fn where_slot(mut self, name: &str, constraint: ScopeConstraint) -> Self {
        self.slots.entry(name.to_string()).or_default().constraint = Some(constraint);
        self
    }

    /// Sets the scope of an entity slot through a fresh builder.
    #[must_use]
    pub fn where_scope(self, name: &str, configure: impl FnOnce(&mut ScopeConstraintBuilder)) -> Self {
        let mut builder = ScopeConstraintBuilder::new();
        configure(&mut builder);
        self.where_slot(name, builder.build())
    }

    /// Sets the target action.
    #[must_use]
    pub fn maps_to(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// One-token free text slot.
    #[must_use]
    pub fn text(self, name: &str) -> Self {
        self.slot(name, SlotType::Text)
    }

    /// Instrument slot (an entity used as a tool).
    #[must_use]
    pub fn instrument(self, name: &str) -> Self {
        self.slot(name, SlotType::Instrument)
    }

    /// Number slot.
    #[must_use]
    pub fn number(self, name: &str) -> Self {
        self.slot(name, SlotType::Number)
    }

    /// Ordinal slot.
    #[must_use]
    pub fn ordinal(self, name: &str) -> Self {
        self.slot(name, SlotType::Ordinal)
    }

    /// Time slot.
    #[must_use]
    pub fn time(self, name: &str) -> Self {
        self.slot(name, SlotType::Time)
    }

    /// Direction slot.
    #[must_use]
    pub fn direction(self, name: &str) -> Self {
        self.slot(name, SlotType::Direction)
    }

    /// Manner slot.
    #[must_use]
    pub fn manner(self, name: &str) -> Self {
        self.slot(name, SlotType::Manner)
    }

    /// Quoted text slot.
    #[must_use]
    pub fn quoted_text(self, name: &str) -> Self {
        self.slot(name, SlotType::QuotedText)
    }

    /// Topic slot.
    #[must_use]
    pub fn topic(self, name: &str) -> Self {
        self.slot(name, SlotType::Topic)
    }

    /// Slot matching a word from a vocabulary category.
    #[must_use]
    pub fn from_vocabulary(self, name: &str, category: impl Into<String>) -> Self {
        self.slot(name, SlotType::Vocabulary(category.into()))
    }

    /// Replaces the word-keyed semantics.
    #[must_use]
    pub fn with_semantics(mut self, mapping: SemanticMapping) -> Self {
        self.semantics = Some(mapping);
        self
    }

    /// Adds semantics for a verb word.
    #[must_use]
    pub fn with_semantic_verb(mut self, verb: &str, props: SemanticProperties) -> Self {
        self.semantics
            .get_or_insert_with(SemanticMapping::default)
            .verbs
            .insert(verb.to_lowercase(), props);
        self
    }

    /// Maps a preposition to a spatial relation.
    #[must_use]
    pub fn with_semantic_preposition(mut self, preposition: &str, relation: &str) -> Self {
        self.semantics
            .get_or_insert_with(SemanticMapping::default)
            .prepositions
            .insert(preposition.to_lowercase(), relation.to_string());
        self
    }

    /// Maps a direction word to a canonical direction.
    #[must_use]
    pub fn with_semantic_direction(mut self, word: &str, direction: &str) -> Self {
        self.semantics
            .get_or_insert_with(SemanticMapping::default)
            .directions
            .insert(word.to_lowercase(), direction.to_string());
        self
    }

    /// Sets semantics applied to every match.
    #[must_use]
    pub fn with_default_semantics(mut self, props: SemanticProperties) -> Self {
        self.default_semantics = Some(props);
        self
    }

    /// Compiles the pattern and produces the rule.
    ///
    /// # Errors
    ///
    /// Returns `PatternSyntax` if the pattern does not compile, `MissingSlot`
    /// if a slot is configured that the pattern does not contain, and
    /// `Internal` if no action was set.
    pub fn build(self) -> Result<GrammarRule> {
        let mut compiled = PatternCompiler::compile(&self.pattern)?;
        let action = self.action.ok_or_else(|| {
            Error::new(ErrorKind::Internal(format!(
                "grammar rule '{}' has no target action",
                self.pattern
            )))
        })?;

        for (name, pending) in &self.slots {
            if !compiled.slots.contains_key(name) {
                return Err(Error::missing_slot(name.clone()));
            }
            if let Some(slot_type) = &pending.slot_type {
                compiled.set_slot_type(name, slot_type.clone());
            }
        }

        let mut slots = BTreeMap::new();
        for name in compiled.slots.keys() {
            let slot_type = compiled
                .slot_type(name)
                .cloned()
                .unwrap_or(SlotType::Entity);
            let constraint = self.slots.get(name).and_then(|p| p.constraint.clone());
            slots.insert(
                name.clone(),
                SlotSpec {
                    slot_type,
                    constraint,
                },
            );
        }

        Ok(GrammarRule {
            key: self.key,
            pattern: self.pattern,
            compiled,
            slots,
            action,
            priority: self.priority,
            semantics: self.semantics,
            default_semantics: self.default_semantics,
            sequence: 0,
        })
    }
}

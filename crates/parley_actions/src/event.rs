//! Semantic events: what happened during a turn.
//!
//! Every observable outcome of a command is an event. Actions emit them from
//! `report`, chains derive further events from them, and the text layer renders
//! `action.success` / `action.error` through their `messageId` and `params`.

use std::cell::Cell;
use std::fmt;

use parley_foundation::{EntityId, Value};

/// Event type of a successful action's final event.
pub const ACTION_SUCCESS: &str = "action.success";
/// Event type of every failure.
pub const ACTION_ERROR: &str = "action.error";

/// Unique event identifier, monotonically increasing per engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt-{}", self.0)
    }
}

impl From<EventId> for Value {
    fn from(id: EventId) -> Self {
        // Ids stay far below i64::MAX in practice.
        Self::Int(i64::try_from(id.0).unwrap_or(i64::MAX))
    }
}

/// The entities an event is about, by role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventEntities {
    /// Who acted.
    pub actor: Option<EntityId>,
    /// What was acted on.
    pub target: Option<EntityId>,
    /// What was used.
    pub instrument: Option<EntityId>,
    /// Where it happened.
    pub location: Option<EntityId>,
    /// Anything else involved.
    pub others: Vec<EntityId>,
}

impl EventEntities {
    /// Every entity mentioned, in role order.
    #[must_use]
    pub fn all(&self) -> Vec<EntityId> {
        [self.actor, self.target, self.instrument, self.location]
            .into_iter()
            .flatten()
            .chain(self.others.iter().copied())
            .collect()
    }
}

/// An immutable event.
#[derive(Clone, Debug, PartialEq)]
pub struct SemanticEvent {
    /// Identifier.
    pub id: EventId,
    /// Dotted type name (`"if.event.opened"`, `"action.success"`).
    pub event_type: String,
    /// Turn number the event was emitted in.
    pub timestamp: u64,
    /// Entities by role.
    pub entities: EventEntities,
    /// Payload.
    pub data: Value,
}

impl SemanticEvent {
    /// Returns true if the event has the given type.
    #[must_use]
    pub fn is(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }

    /// Looks up a payload field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// `messageId` of an `action.success` / `action.error` event.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.get("messageId").and_then(Value::as_str)
    }

    /// `error` code of an `action.error` event.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.get("error").and_then(Value::as_str)
    }

    /// `params` of an `action.success` / `action.error` event.
    #[must_use]
    pub fn params(&self) -> Option<&Value> {
        self.get("params")
    }

    /// Returns true for an `action.error` event.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is(ACTION_ERROR)
    }
}

/// An event before it gets an id and timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct EventDraft {
    /// Dotted type name.
    pub event_type: String,
    /// Entities by role.
    pub entities: EventEntities,
    /// Payload.
    pub data: Value,
}

impl EventDraft {
    /// Starts a draft with an empty map payload.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entities: EventEntities::default(),
            data: Value::map(),
        }
    }

    /// Sets the actor.
    #[must_use]
    pub fn with_actor(mut self, actor: EntityId) -> Self {
        self.entities.actor = Some(actor);
        self
    }

    /// Sets the target.
    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.entities.target = Some(target);
        self
    }

    /// Sets the instrument.
    #[must_use]
    pub fn with_instrument(mut self, instrument: EntityId) -> Self {
        self.entities.instrument = Some(instrument);
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: EntityId) -> Self {
        self.entities.location = Some(location);
        self
    }

    /// Adds another involved entity.
    #[must_use]
    pub fn with_other(mut self, other: EntityId) -> Self {
        self.entities.others.push(other);
        self
    }

    /// Sets a payload field.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data = self.data.with(key, value);
        self
    }

    /// Replaces the whole payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Stamps drafts with ids and the current turn.
///
/// Shared by actions and chains so ids stay unique within a turn. `create`
/// takes `&self` because `report` only sees a shared context.
#[derive(Debug)]
pub struct EventFactory {
    turn: u64,
    next: Cell<u64>,
}

impl EventFactory {
    /// A factory for `turn` whose first id is `first_id`.
    #[must_use]
    pub fn new(turn: u64, first_id: u64) -> Self {
        Self {
            turn,
            next: Cell::new(first_id),
        }
    }

    /// The turn being stamped.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// The id the next event will get.
    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.next.get()
    }

    /// Turns a draft into an event.
    #[must_use]
    pub fn create(&self, draft: EventDraft) -> SemanticEvent {
        let id = self.next.get();
        self.next.set(id + 1);
        SemanticEvent {
            id: EventId(id),
            event_type: draft.event_type,
            timestamp: self.turn,
            entities: draft.entities,
            data: draft.data,
        }
    }

    /// Shorthand for `create(EventDraft::new(event_type).with_data(data))`.
    #[must_use]
    pub fn event(&self, event_type: &str, data: Value) -> SemanticEvent {
        self.create(EventDraft::new(event_type).with_data(data))
    }
}

impl Default for EventFactory {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

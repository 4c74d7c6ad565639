//! Trace event and record types.

use parley_foundation::EntityId;

// =============================================================================
// Turn Phase
// =============================================================================

/// Phase of turn execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// Turn start and end.
    Turn,
    /// Tokenizing the input.
    Parse,
    /// Matching grammar rules.
    Match,
    /// Resolving slots against scope.
    Resolve,
    /// Running `validate`.
    Validate,
    /// Running `execute`.
    Execute,
    /// Events produced by `report`.
    Report,
    /// Chain derivation.
    Chain,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Turn => write!(f, "turn"),
            Self::Parse => write!(f, "parse"),
            Self::Match => write!(f, "match"),
            Self::Resolve => write!(f, "resolve"),
            Self::Validate => write!(f, "validate"),
            Self::Execute => write!(f, "execute"),
            Self::Report => write!(f, "report"),
            Self::Chain => write!(f, "chain"),
        }
    }
}

// =============================================================================
// Trace Event
// =============================================================================

/// Events that can be traced during a turn.
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    /// A turn has started.
    TurnStart {
        /// The turn number.
        turn: u64,
        /// Raw input.
        input: String,
    },

    /// The input was tokenized.
    Tokenized {
        /// Normalized words.
        words: Vec<String>,
    },

    /// The best grammar rule for the input.
    RuleMatched {
        /// Rule key.
        rule: String,
        /// Target action.
        action: String,
        /// Match confidence.
        confidence: f64,
        /// How many rules matched in total.
        candidates: usize,
    },

    /// A slot of the best match was resolved.
    ScopeResolved {
        /// Slot name.
        slot: String,
        /// Words the slot consumed.
        text: String,
        /// Entities it resolved to.
        entities: Vec<EntityId>,
    },

    /// An action's validation ran.
    Validated {
        /// Action id.
        action: String,
        /// Error code when invalid.
        error: Option<String>,
    },

    /// An action's execution ran.
    Executed {
        /// Action id.
        action: String,
        /// Execution error, rendered.
        error: Option<String>,
    },

    /// An event was added to the turn log.
    EventEmitted {
        /// Event id.
        id: u64,
        /// Event type.
        event_type: String,
    },

    /// A chain derived an event.
    ChainFired {
        /// Chain key.
        key: String,
        /// Trigger event id.
        trigger: u64,
        /// Derived event id.
        derived: u64,
        /// Derivation depth.
        depth: usize,
    },

    /// A turn has ended.
    TurnEnd {
        /// The turn number.
        turn: u64,
        /// Whether no `action.error` was emitted.
        success: bool,
    },
}

impl TraceEvent {
    /// Returns a short name for the event type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TurnStart { .. } => "turn-start",
            Self::Tokenized { .. } => "tokenized",
            Self::RuleMatched { .. } => "rule-matched",
            Self::ScopeResolved { .. } => "scope-resolved",
            Self::Validated { .. } => "validated",
            Self::Executed { .. } => "executed",
            Self::EventEmitted { .. } => "event-emitted",
            Self::ChainFired { .. } => "chain-fired",
            Self::TurnEnd { .. } => "turn-end",
        }
    }

    /// The phase this event belongs to.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        match self {
            Self::TurnStart { .. } | Self::TurnEnd { .. } => TurnPhase::Turn,
            Self::Tokenized { .. } => TurnPhase::Parse,
            Self::RuleMatched { .. } => TurnPhase::Match,
            Self::ScopeResolved { .. } => TurnPhase::Resolve,
            Self::Validated { .. } => TurnPhase::Validate,
            Self::Executed { .. } => TurnPhase::Execute,
            Self::EventEmitted { .. } => TurnPhase::Report,
            Self::ChainFired { .. } => TurnPhase::Chain,
        }
    }

    /// Returns true if this is a turn boundary event.
    #[must_use]
    pub fn is_turn_boundary(&self) -> bool {
        matches!(self, Self::TurnStart { .. } | Self::TurnEnd { .. })
    }
}

// =============================================================================
// Trace Record
// =============================================================================

/// A timestamped trace record.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceRecord {
    /// Unique record ID within the session.
    pub id: u64,
    /// The turn when this event occurred.
    pub turn: u64,
    /// Timestamp in nanoseconds since the tracer was created.
    pub timestamp_ns: u64,
    /// The trace event.
    pub event: TraceEvent,
}

impl TraceRecord {
    /// Creates a new trace record.
    #[must_use]
    pub fn new(id: u64, turn: u64, timestamp_ns: u64, event: TraceEvent) -> Self {
        Self {
            id,
            turn,
            timestamp_ns,
            event,
        }
    }

    /// Returns the event type name.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}

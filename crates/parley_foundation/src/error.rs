//! Error types for the Parley system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! These are programmer-facing errors: malformed grammar patterns, duplicate
//! vocabulary categories, bad world mutations. Player-facing failures travel
//! as `action.error` events instead.

use std::fmt;

use thiserror::Error;

use crate::entity::EntityId;

/// The main error type for Parley operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a pattern syntax error.
    #[must_use]
    pub fn pattern_syntax(
        pattern: impl Into<String>,
        position: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::PatternSyntax {
            pattern: pattern.into(),
            position,
            message: message.into(),
        })
    }

    /// Creates a duplicate vocabulary category error.
    #[must_use]
    pub fn vocabulary_exists(category: impl Into<String>) -> Self {
        Self::new(ErrorKind::VocabularyExists(category.into()))
    }

    /// Creates a missing vocabulary category error.
    #[must_use]
    pub fn vocabulary_missing(category: impl Into<String>) -> Self {
        Self::new(ErrorKind::VocabularyMissing(category.into()))
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(id: EntityId) -> Self {
        Self::new(ErrorKind::EntityNotFound(id))
    }

    /// Creates a stale entity reference error.
    #[must_use]
    pub fn stale_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::StaleEntity(id))
    }

    /// Creates an invalid move error.
    #[must_use]
    pub fn invalid_move(entity: EntityId, destination: EntityId, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidMove {
            entity,
            destination,
            reason: reason.into(),
        })
    }

    /// Creates a trait not found error.
    #[must_use]
    pub fn trait_not_found(entity: EntityId, trait_name: impl Into<String>) -> Self {
        Self::new(ErrorKind::TraitNotFound {
            entity,
            trait_name: trait_name.into(),
        })
    }

    /// Creates an unknown action error.
    #[must_use]
    pub fn unknown_action(action: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownAction(action.into()))
    }

    /// Creates a missing slot error.
    #[must_use]
    pub fn missing_slot(slot: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingSlot(slot.into()))
    }
}

/// Categorized error kinds.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A grammar pattern could not be compiled.
    #[error("pattern syntax error in '{pattern}' at token {position}: {message}")]
    PatternSyntax {
        /// The offending pattern source.
        pattern: String,
        /// Zero-based token index where compilation failed.
        position: usize,
        /// Description of the problem.
        message: String,
    },

    /// A vocabulary category was defined twice.
    #[error("Vocabulary category '{0}' already exists")]
    VocabularyExists(String),

    /// A vocabulary category was extended before being defined.
    #[error("Vocabulary category '{0}' does not exist")]
    VocabularyMissing(String),

    /// Entity was not found in the world.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// Entity reference is stale (generation mismatch).
    #[error("stale entity reference: {0:?}")]
    StaleEntity(EntityId),

    /// Moving an entity would break the containment tree.
    #[error("cannot move {entity:?} into {destination:?}: {reason}")]
    InvalidMove {
        /// The entity being moved.
        entity: EntityId,
        /// The requested destination.
        destination: EntityId,
        /// Why the move was rejected.
        reason: String,
    },

    /// Trait not present on entity.
    #[error("trait not found: {trait_name} on entity {entity:?}")]
    TraitNotFound {
        /// The entity that was queried.
        entity: EntityId,
        /// The trait that was not found.
        trait_name: String,
    },

    /// No action registered under the given id.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// An action required a slot the resolved command does not carry.
    #[error("missing command slot: {0}")]
    MissingSlot(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Rule key, action id or story source.
    pub source: Option<String>,
    /// Stack of pipeline stages that were active.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

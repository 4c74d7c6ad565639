//! Validation outcomes and execution faults.

use parley_foundation::Value;
use thiserror::Error;

/// The result of an action's `validate` phase.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationResult {
    /// The action may proceed.
    Valid,
    /// The action is blocked by a domain rule.
    Invalid {
        /// Stable error code (`"already_open"`).
        error: String,
        /// Message to render, usually the same as `error`.
        message_id: String,
        /// Message parameters (a map).
        params: Value,
    },
}

impl ValidationResult {
    /// An invalid result whose message id equals its code.
    #[must_use]
    pub fn invalid(error: impl Into<String>) -> Self {
        let error = error.into();
        Self::Invalid {
            message_id: error.clone(),
            error,
            params: Value::map(),
        }
    }

    /// Adds a message parameter. No-op on `Valid`.
    #[must_use]
    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Self::Invalid { params, .. } = &mut self {
            *params = params.with(key, value);
        }
        self
    }

    /// Overrides the message id. No-op on `Valid`.
    #[must_use]
    pub fn with_message(mut self, id: impl Into<String>) -> Self {
        if let Self::Invalid { message_id, .. } = &mut self {
            *message_id = id.into();
        }
        self
    }

    /// Returns true for `Valid`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The error code of an invalid result.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { error, .. } => Some(error),
        }
    }
}

/// An unexpected fault while mutating the world.
///
/// Never shown raw to the player; `report` turns it into an `action.error`
/// with code `execution_failed`.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A world mutation was rejected.
    #[error("world mutation failed: {0}")]
    World(#[from] parley_foundation::Error),

    /// The command lacked a slot the action needs.
    #[error("command has no {0}")]
    MissingSlot(String),

    /// Anything else.
    #[error("{0}")]
    Failed(String),
}

//! The three-phase action contract, the registry and the runner.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::validation::{ExecutionError, ValidationResult};

/// A player action: validate, then execute, then report.
///
/// - `validate` reads the world and decides whether the action may run. It
///   never mutates and never fails hard; domain refusals are
///   [`ValidationResult::Invalid`].
/// - `execute` performs the one mutation the action stands for, stashing
///   whatever `report` needs from before the change.
/// - `report` is the only phase that produces events. It must return events
///   for every combination of validation result and execution error.
pub trait Action {
    /// Stable id (`"if.action.opening"`).
    fn id(&self) -> &str;

    /// Group the action belongs to (`"container_manipulation"`).
    fn group(&self) -> &str;

    /// Message ids the action may emit.
    fn required_messages(&self) -> &'static [&'static str];

    /// Checks preconditions.
    fn validate(&self, ctx: &ActionContext<'_>) -> ValidationResult;

    /// Mutates the world. Only called after `validate` returned `Valid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation could not be applied.
    fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError>;

    /// Produces the events describing what happened.
    fn report(
        &self,
        ctx: &ActionContext<'_>,
        validation: Option<&ValidationResult>,
        error: Option<&ExecutionError>,
    ) -> Vec<SemanticEvent>;
}

// =============================================================================
// Registry
// =============================================================================

/// Actions by id.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Box<dyn Action>>,
}

impl ActionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action, replacing any with the same id.
    pub fn register(&mut self, action: impl Action + 'static) {
        debug!(action = action.id(), "action registered");
        self.actions.insert(action.id().to_string(), Box::new(action));
    }

    /// Looks up an action.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn Action> {
        self.actions.get(id).map(AsRef::as_ref)
    }

    /// Returns true if an action with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.actions.contains_key(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.ids())
            .finish()
    }
}

// =============================================================================
// Runner
// =============================================================================

/// What one action run produced.
#[derive(Clone, Debug)]
pub struct ActionOutcome {
    /// Events from `report`, never empty.
    pub events: Vec<SemanticEvent>,
    /// The validation result.
    pub validation: ValidationResult,
    /// Whether `execute` was called.
    pub executed: bool,
    /// The execution error, rendered.
    pub error: Option<String>,
}

impl ActionOutcome {
    /// Validation passed and execution did not fail.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.validation.is_valid() && self.error.is_none()
    }
}

/// Drives the validate, execute, report sequence.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionRunner;

impl ActionRunner {
    /// Runs an action to completion.
    ///
    /// Invalid validation goes straight to `report`; `execute` is never
    /// called in that case.
    pub fn run(action: &dyn Action, ctx: &mut ActionContext<'_>) -> ActionOutcome {
        let validation = action.validate(ctx);
        if let Some(code) = validation.error() {
            debug!(action = action.id(), error = code, "validation failed");
            let events = Self::ensure_events(action, ctx, &validation, None);
            return ActionOutcome {
                events,
                validation,
                executed: false,
                error: None,
            };
        }

        let error = action.execute(ctx).err();
        if let Some(err) = &error {
            warn!(action = action.id(), %err, "action execution failed");
        }
        let events = Self::ensure_events(action, ctx, &validation, error.as_ref());
        ActionOutcome {
            events,
            validation,
            executed: true,
            error: error.map(|e| e.to_string()),
        }
    }

    fn ensure_events(
        action: &dyn Action,
        ctx: &ActionContext<'_>,
        validation: &ValidationResult,
        error: Option<&ExecutionError>,
    ) -> Vec<SemanticEvent> {
        let events = action.report(ctx, Some(validation), error);
        if events.is_empty() {
            warn!(action = action.id(), "report produced no events");
            return vec![helpers::execution_failed(
                ctx,
                action.id(),
                "report produced no events",
            )];
        }
        events
    }
}

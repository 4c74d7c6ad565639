//! Actions and event chains for Parley.
//!
//! An action turns a resolved command into world changes and events, in three
//! phases:
//!
//! ```text
//! ResolvedCommand
//!        │
//!        ▼
//! ┌──────────────┐  invalid   ┌──────────────────────────┐
//! │  validate    │ ─────────► │ report → [action.error]  │
//! └──────────────┘            └──────────────────────────┘
//!        │ valid
//!        ▼
//! ┌──────────────┐
//! │  execute     │  (only phase holding &mut World)
//! └──────────────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │  report      │ → [domain event, if.event.*, action.success]
//! └──────────────┘    or [action.error "execution_failed"]
//!        │
//!        ▼
//! ┌──────────────┐
//! │  chains      │ → derived events inserted after their triggers
//! └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`action`] - The [`Action`] trait, registry and runner
//! - [`chain`] - Event chain registry
//! - [`command`] - Resolved commands
//! - [`context`] - Per-run action context
//! - [`event`] - Semantic events and the event factory
//! - [`helpers`] - Reachability, snapshots and standard events
//! - [`standard`] - Standard actions and chains
//! - [`validation`] - Validation results and execution errors

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod chain;
pub mod command;
pub mod context;
pub mod event;
pub mod helpers;
pub mod standard;
pub mod validation;

pub use action::{Action, ActionOutcome, ActionRegistry, ActionRunner};
pub use chain::{ChainFiring, ChainHandler, ChainMode, ChainOptions, ChainRegistry, ChainResult};
pub use command::ResolvedCommand;
pub use context::ActionContext;
pub use event::{
    ACTION_ERROR, ACTION_SUCCESS, EventDraft, EventEntities, EventFactory, EventId, SemanticEvent,
};
pub use standard::{register_standard_actions, register_standard_chains};
pub use validation::{ExecutionError, ValidationResult};

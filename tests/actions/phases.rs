//! The validate, execute, report contract.

use std::cell::Cell;

use parley_actions::helpers;
use parley_actions::{
    ACTION_ERROR, ACTION_SUCCESS, Action, ActionContext, ActionRunner, EventFactory,
    ExecutionError, ResolvedCommand, SemanticEvent, ValidationResult,
};
use parley_foundation::{EntityId, Value};
use parley_world::{EntitySpec, Trait, World};
use proptest::prelude::*;

/// Rings a bell; refuses when told to, fails when told to.
#[derive(Default)]
struct RingingAction {
    refuse: bool,
    fail: bool,
    silent: bool,
    executed: Cell<usize>,
}

impl Action for RingingAction {
    fn id(&self) -> &str {
        "story.ringing"
    }

    fn group(&self) -> &str {
        "noise"
    }

    fn required_messages(&self) -> &'static [&'static str] {
        &["rung", "bell_stuck"]
    }

    fn validate(&self, _ctx: &ActionContext<'_>) -> ValidationResult {
        if self.refuse {
            ValidationResult::invalid("bell_stuck").with_param("item", "bell")
        } else {
            ValidationResult::Valid
        }
    }

    fn execute(&self, _ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError> {
        self.executed.set(self.executed.get() + 1);
        if self.fail {
            Err(ExecutionError::Failed("clapper fell off".into()))
        } else {
            Ok(())
        }
    }

    fn report(
        &self,
        ctx: &ActionContext<'_>,
        validation: Option<&ValidationResult>,
        error: Option<&ExecutionError>,
    ) -> Vec<SemanticEvent> {
        if let Some(events) = helpers::failure_events(ctx, self.id(), validation, error) {
            return events;
        }
        if self.silent {
            return Vec::new();
        }
        vec![helpers::success_event(ctx, self.id(), "rung", Value::map())]
    }
}

fn world() -> (World, EntityId) {
    let mut world = World::new();
    let room = world
        .create_entity(EntitySpec::new("belfry").with_trait(Trait::room()), None)
        .unwrap();
    let player = world
        .create_entity(
            EntitySpec::new("yourself").with_trait(Trait::Actor { is_player: true }),
            Some(room),
        )
        .unwrap();
    (world, player)
}

fn run(action: &RingingAction) -> parley_actions::ActionOutcome {
    let (mut world, player) = world();
    let command = ResolvedCommand::new(action.id(), player);
    let factory = EventFactory::new(1, 1);
    let mut ctx = ActionContext::new(&mut world, &command, &factory);
    ActionRunner::run(action, &mut ctx)
}

#[test]
fn success_path_reports_success() {
    let action = RingingAction::default();
    let outcome = run(&action);
    assert!(outcome.succeeded());
    assert!(outcome.executed);
    assert_eq!(action.executed.get(), 1);
    assert_eq!(outcome.events.len(), 1);
    assert!(outcome.events[0].is(ACTION_SUCCESS));
    assert_eq!(outcome.events[0].message_id(), Some("rung"));
}

#[test]
fn invalid_validation_reports_one_error() {
    let action = RingingAction {
        refuse: true,
        ..RingingAction::default()
    };
    let outcome = run(&action);
    assert!(!outcome.executed);
    assert_eq!(outcome.events.len(), 1);
    let event = &outcome.events[0];
    assert!(event.is(ACTION_ERROR));
    assert_eq!(event.error_code(), Some("bell_stuck"));
    assert_eq!(
        event.params().and_then(|p| p.get("item")).and_then(Value::as_str),
        Some("bell")
    );
}

#[test]
fn execution_fault_becomes_execution_failed() {
    let action = RingingAction {
        fail: true,
        ..RingingAction::default()
    };
    let outcome = run(&action);
    assert!(outcome.executed);
    assert!(!outcome.succeeded());
    assert_eq!(outcome.error.as_deref(), Some("clapper fell off"));
    assert_eq!(outcome.events[0].error_code(), Some("execution_failed"));
}

#[test]
fn empty_report_is_replaced() {
    let action = RingingAction {
        silent: true,
        ..RingingAction::default()
    };
    let outcome = run(&action);
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].error_code(), Some("execution_failed"));
}

proptest! {
    #[test]
    fn execute_never_follows_invalid_validation(refuse in any::<bool>(), fail in any::<bool>(), runs in 1usize..5) {
        let action = RingingAction { refuse, fail, ..RingingAction::default() };
        for _ in 0..runs {
            let outcome = run(&action);
            prop_assert_eq!(outcome.executed, !refuse);
            prop_assert!(!outcome.events.is_empty());
            if refuse {
                prop_assert_eq!(outcome.events.len(), 1);
                prop_assert_eq!(outcome.events[0].error_code(), Some("bell_stuck"));
            }
        }
        prop_assert_eq!(action.executed.get(), if refuse { 0 } else { runs });
    }
}

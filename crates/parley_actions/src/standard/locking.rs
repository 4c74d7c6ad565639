//! Locking.

use parley_foundation::Value;
use parley_grammar::stdlib::actions;
use parley_world::{TraitType, WorldModel};

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::events;
use crate::standard::unlocking::{check_key, lock_params};
use crate::validation::{ExecutionError, ValidationResult};

/// `lock :target [with :key]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LockingAction;

const MESSAGES: &[&str] = &[
    "no_target",
    "not_lockable",
    "already_locked",
    "not_closed",
    "no_key",
    "wrong_key",
    "key_not_held",
    "cant_reach",
    "locked",
    "locked_with",
];

impl Action for LockingAction {
    fn id(&self) -> &str {
        actions::LOCKING
    }

    fn group(&self) -> &str {
        "lock_manipulation"
    }

    fn required_messages(&self) -> &'static [&'static str] {
        MESSAGES
    }

    fn validate(&self, ctx: &ActionContext<'_>) -> ValidationResult {
        let Some(target) = ctx.direct_object() else {
            return ValidationResult::invalid("no_target");
        };
        let world = ctx.world();
        let name = target.name.as_ref();

        if !target.has_trait(&TraitType::Lockable) {
            return ValidationResult::invalid("not_lockable").with_param("item", name);
        }
        if world.is_locked(target.id) {
            return ValidationResult::invalid("already_locked").with_param("item", name);
        }
        // Things that cannot be opened count as closed.
        if target.has_trait(&TraitType::Openable) && world.is_open(target.id) {
            return ValidationResult::invalid("not_closed").with_param("item", name);
        }
        if !helpers::can_reach(world, ctx.actor(), target.id) {
            return ValidationResult::invalid("cant_reach").with_param("item", name);
        }
        check_key(ctx, target).unwrap_or(ValidationResult::Valid)
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError> {
        let target = ctx
            .command
            .direct_object
            .ok_or_else(|| ExecutionError::MissingSlot("target".into()))?;
        ctx.world_mut().set_locked(target, true)?;
        Ok(())
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
        let Some(target) = ctx.command.direct_object else {
            return vec![helpers::execution_failed(ctx, self.id(), "no target to report")];
        };
        let world = ctx.world();
        let (with_key, params) = lock_params(ctx, target);
        let data = Value::map()
            .with("targetId", target)
            .with("targetName", world.name_of(target))
            .with("keyId", ctx.command.instrument);

        vec![
            helpers::domain_event(ctx, "locked", data.clone()),
            helpers::domain_event(
                ctx,
                events::LOCKED,
                data.with("target", helpers::snapshot(world, target)),
            ),
            helpers::success_event(
                ctx,
                self.id(),
                if with_key { "locked_with" } else { "locked" },
                params,
            ),
        ]
    }
}

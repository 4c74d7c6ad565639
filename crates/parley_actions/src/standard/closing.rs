//! Closing containers and doors.

use parley_foundation::Value;
use parley_grammar::stdlib::actions;
use parley_world::{TraitType, WorldModel};

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::events;
use crate::validation::{ExecutionError, ValidationResult};

/// `close :target`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosingAction;

const MESSAGES: &[&str] = &[
    "no_target",
    "not_closable",
    "already_closed",
    "cant_reach",
    "closed",
];

impl Action for ClosingAction {
    fn id(&self) -> &str {
        actions::CLOSING
    }

    fn group(&self) -> &str {
        "container_manipulation"
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

        if !target.has_trait(&TraitType::Openable) {
            return ValidationResult::invalid("not_closable").with_param("item", name);
        }
        if !world.is_open(target.id) {
            return ValidationResult::invalid("already_closed").with_param("item", name);
        }
        if !helpers::can_reach(world, ctx.actor(), target.id) {
            return ValidationResult::invalid("cant_reach").with_param("item", name);
        }
        ValidationResult::Valid
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError> {
        let target = ctx
            .command
            .direct_object
            .ok_or_else(|| ExecutionError::MissingSlot("target".into()))?;
        ctx.world_mut().set_open(target, false)?;
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
        let name = world.name_of(target);

        vec![
            helpers::domain_event(
                ctx,
                "closed",
                Value::map()
                    .with("targetId", target)
                    .with("targetName", name.clone()),
            ),
            helpers::domain_event(
                ctx,
                events::CLOSED,
                Value::map()
                    .with("targetId", target)
                    .with("targetName", name.clone())
                    .with("isContainer", world.has_trait(target, &TraitType::Container))
                    .with("isDoor", world.has_trait(target, &TraitType::Door))
                    .with("target", helpers::snapshot(world, target)),
            ),
            helpers::success_event(ctx, self.id(), "closed", Value::map().with("item", name)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::testing::{Fixture, types};
    use parley_world::{EntitySpec, Trait};

    #[test]
    fn closes_open_things() {
        let mut fx = Fixture::new();
        let door = fx.add(EntitySpec::new("door").with_trait(Trait::openable(true)), fx.room);
        let command = fx.command(actions::CLOSING).with_direct_object(door);

        let outcome = fx.run(&ClosingAction, &command);
        assert_eq!(types(&outcome), vec!["closed", events::CLOSED, "action.success"]);
        assert!(!fx.world.is_open(door));

        let again = fx.run(&ClosingAction, &command);
        assert_eq!(again.events[0].error_code(), Some("already_closed"));
    }

    #[test]
    fn plain_things_are_not_closable() {
        let mut fx = Fixture::new();
        let rock = fx.add(EntitySpec::new("rock"), fx.room);
        let command = fx.command(actions::CLOSING).with_direct_object(rock);
        let outcome = fx.run(&ClosingAction, &command);
        assert_eq!(outcome.events[0].error_code(), Some("not_closable"));
    }
}

//! Putting things down.

use parley_foundation::Value;
use parley_grammar::stdlib::actions;
use parley_world::WorldModel;

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::events;
use crate::validation::{ExecutionError, ValidationResult};

/// `drop :items`. Items land wherever the actor stands.
#[derive(Clone, Copy, Debug, Default)]
pub struct DroppingAction;

const MESSAGES: &[&str] = &["no_target", "not_held", "cant_drop_here", "dropped"];

impl Action for DroppingAction {
    fn id(&self) -> &str {
        actions::DROPPING
    }

    fn group(&self) -> &str {
        "object_manipulation"
    }

    fn required_messages(&self) -> &'static [&'static str] {
        MESSAGES
    }

    fn validate(&self, ctx: &ActionContext<'_>) -> ValidationResult {
        let Some(item) = ctx.direct_object() else {
            return ValidationResult::invalid("no_target");
        };
        let world = ctx.world();
        if !helpers::is_held(world, ctx.actor(), item.id) {
            return ValidationResult::invalid("not_held").with_param("item", item.name.as_ref());
        }
        if world.location(ctx.actor()).is_none() {
            return ValidationResult::invalid("cant_drop_here");
        }
        ValidationResult::Valid
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError> {
        let item = ctx
            .command
            .direct_object
            .ok_or_else(|| ExecutionError::MissingSlot("item".into()))?;
        let destination = ctx
            .world()
            .location(ctx.actor())
            .ok_or_else(|| ExecutionError::Failed("actor is nowhere".into()))?;

        ctx.world_mut().move_entity(item, destination)?;
        ctx.stash("destination", destination);
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
        let Some(item) = ctx.command.direct_object else {
            return vec![helpers::execution_failed(ctx, self.id(), "no item to report")];
        };
        let world = ctx.world();
        let name = world.name_of(item);
        let destination = ctx.stashed("destination").and_then(Value::as_entity);

        let mut rich = Value::map()
            .with("item", name.clone())
            .with("itemId", item)
            .with("toLocation", destination)
            .with("itemSnapshot", helpers::snapshot(world, item));
        if let Some(room) = ctx.room() {
            rich = rich.with("room", helpers::room_snapshot(world, room));
        }

        vec![
            helpers::domain_event(
                ctx,
                "dropped",
                Value::map()
                    .with("itemId", item)
                    .with("itemName", name.clone()),
            ),
            helpers::domain_event(ctx, events::DROPPED, rich),
            helpers::success_event(ctx, self.id(), "dropped", Value::map().with("item", name)),
        ]
    }
}

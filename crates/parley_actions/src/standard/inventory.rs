//! Listing what the actor carries.

use parley_foundation::{EntityId, Value};
use parley_grammar::stdlib::actions;
use parley_world::WorldModel;

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::{events, list_names};
use crate::validation::{ExecutionError, ValidationResult};

/// `inventory`.
#[derive(Clone, Copy, Debug, Default)]
pub struct InventoryAction;

const MESSAGES: &[&str] = &["carrying", "empty_handed"];

impl Action for InventoryAction {
    fn id(&self) -> &str {
        actions::INVENTORY
    }

    fn group(&self) -> &str {
        "observation"
    }

    fn required_messages(&self) -> &'static [&'static str] {
        MESSAGES
    }

    fn validate(&self, _ctx: &ActionContext<'_>) -> ValidationResult {
        ValidationResult::Valid
    }

    fn execute(&self, _ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError> {
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
        let world = ctx.world();
        let actor = ctx.actor();
        let items: Vec<EntityId> = world.contents(actor);
        let names: Vec<String> = items
            .iter()
            .map(|id| world.name_of(*id).to_string())
            .collect();
        let count = i64::try_from(items.len()).unwrap_or(i64::MAX);

        let success = if items.is_empty() {
            helpers::success_event(ctx, self.id(), "empty_handed", Value::map())
        } else {
            helpers::success_event(
                ctx,
                self.id(),
                "carrying",
                Value::map().with("items", list_names(&names)),
            )
        };

        vec![
            helpers::domain_event(
                ctx,
                "inventory",
                Value::map().with("actorId", actor).with("itemCount", count),
            ),
            helpers::domain_event(
                ctx,
                events::INVENTORY,
                Value::map()
                    .with("actor", helpers::snapshot(world, actor))
                    .with("items", helpers::item_list(world, &items)),
            ),
            success,
        ]
    }
}

//! Putting things in containers and on supporters.

use parley_foundation::{EntityId, Value};
use parley_grammar::stdlib::actions;
use parley_world::{Trait, TraitType, World, WorldModel};

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::events;
use crate::validation::{ExecutionError, ValidationResult};

/// `put :item in|on :destination`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PuttingAction;

const MESSAGES: &[&str] = &[
    "no_target",
    "no_destination",
    "not_held",
    "cant_put_in_itself",
    "cant_put_on_itself",
    "already_there",
    "not_container",
    "not_surface",
    "container_closed",
    "no_room",
    "no_space",
    "cant_reach",
    "put_in",
    "put_on",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Relation {
    In,
    On,
}

impl Relation {
    /// From the derived semantics, then the preposition, then the
    /// destination's traits.
    fn of(ctx: &ActionContext<'_>, destination: EntityId) -> Self {
        let word = ctx
            .command
            .semantics
            .spatial_relation
            .as_deref()
            .or(ctx.command.preposition.as_deref());
        match word {
            Some("on" | "onto") => Self::On,
            Some("in" | "into" | "inside") => Self::In,
            _ if ctx.world().has_trait(destination, &TraitType::Supporter)
                && !ctx.world().has_trait(destination, &TraitType::Container) =>
            {
                Self::On
            }
            _ => Self::In,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::On => "on",
        }
    }
}

fn is_full(world: &World, destination: EntityId, trait_type: &TraitType) -> bool {
    let capacity = match world.get_trait(destination, trait_type) {
        Some(Trait::Container { capacity, .. } | Trait::Supporter { capacity }) => *capacity,
        _ => None,
    };
    capacity.is_some_and(|max| world.contents(destination).len() >= max)
}

impl Action for PuttingAction {
    fn id(&self) -> &str {
        actions::PUTTING
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
        let Some(destination) = ctx.indirect_object() else {
            return ValidationResult::invalid("no_destination")
                .with_param("item", item.name.as_ref());
        };
        let world = ctx.world();
        let relation = Relation::of(ctx, destination.id);
        let item_name = item.name.as_ref();
        let dest_name = destination.name.as_ref();

        if !helpers::is_held(world, ctx.actor(), item.id) {
            return ValidationResult::invalid("not_held").with_param("item", item_name);
        }
        if item.id == destination.id || world.is_within(destination.id, item.id) {
            let code = match relation {
                Relation::In => "cant_put_in_itself",
                Relation::On => "cant_put_on_itself",
            };
            return ValidationResult::invalid(code).with_param("item", item_name);
        }
        if world.location(item.id) == Some(destination.id) {
            return ValidationResult::invalid("already_there")
                .with_param("item", item_name)
                .with_param("destination", dest_name);
        }

        match relation {
            Relation::In => {
                if !destination.has_trait(&TraitType::Container) {
                    return ValidationResult::invalid("not_container")
                        .with_param("container", dest_name);
                }
                if !world.is_open(destination.id) {
                    return ValidationResult::invalid("container_closed")
                        .with_param("container", dest_name);
                }
                if is_full(world, destination.id, &TraitType::Container) {
                    return ValidationResult::invalid("no_room").with_param("container", dest_name);
                }
            }
            Relation::On => {
                if !destination.has_trait(&TraitType::Supporter) {
                    return ValidationResult::invalid("not_surface")
                        .with_param("surface", dest_name);
                }
                if is_full(world, destination.id, &TraitType::Supporter) {
                    return ValidationResult::invalid("no_space").with_param("surface", dest_name);
                }
            }
        }

        if !helpers::can_reach(world, ctx.actor(), destination.id) {
            return ValidationResult::invalid("cant_reach").with_param("item", dest_name);
        }
        ValidationResult::Valid
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError> {
        let item = ctx
            .command
            .direct_object
            .ok_or_else(|| ExecutionError::MissingSlot("item".into()))?;
        let destination = ctx
            .command
            .indirect_object
            .ok_or_else(|| ExecutionError::MissingSlot("destination".into()))?;
        let relation = Relation::of(ctx, destination);

        ctx.world_mut().move_entity(item, destination)?;
        ctx.stash("relation", relation.as_str());
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
        let (Some(item), Some(destination)) =
            (ctx.command.direct_object, ctx.command.indirect_object)
        else {
            return vec![helpers::execution_failed(ctx, self.id(), "nothing to report")];
        };
        let world = ctx.world();
        let on = ctx.stashed("relation").and_then(Value::as_str) == Some("on");
        let item_name = world.name_of(item);
        let dest_name = world.name_of(destination);

        let data = Value::map()
            .with("itemId", item)
            .with("targetId", destination)
            .with("relation", if on { "on" } else { "in" });
        let (domain, rich_type, message, dest_param) = if on {
            ("put_on", events::PUT_ON, "put_on", "surface")
        } else {
            ("put_in", events::PUT_IN, "put_in", "container")
        };

        vec![
            helpers::domain_event(ctx, domain, data.clone()),
            helpers::domain_event(
                ctx,
                rich_type,
                data.with("item", item_name.clone())
                    .with("target", dest_name.clone())
                    .with("itemSnapshot", helpers::snapshot(world, item))
                    .with("targetSnapshot", helpers::snapshot(world, destination)),
            ),
            helpers::success_event(
                ctx,
                self.id(),
                message,
                Value::map()
                    .with("item", item_name)
                    .with(dest_param, dest_name),
            ),
        ]
    }
}

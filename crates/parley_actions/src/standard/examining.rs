//! Looking at things, or around the room when there is no target.

use parley_foundation::{EntityId, Value};
use parley_grammar::stdlib::actions;
use parley_world::{TraitType, WorldModel};

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::{events, list_names};
use crate::validation::{ExecutionError, ValidationResult};

/// `examine :target`, `look at :target`, `look`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExaminingAction;

const MESSAGES: &[&str] = &[
    "not_visible",
    "not_in_room",
    "examined",
    "examined_container",
    "room_description",
];

/// Things in `room` the actor can see, excluding the actor.
fn visible_contents(ctx: &ActionContext<'_>, room: EntityId) -> Vec<EntityId> {
    ctx.world()
        .contents(room)
        .into_iter()
        .filter(|id| *id != ctx.actor())
        .collect()
}

fn names(ctx: &ActionContext<'_>, ids: &[EntityId]) -> Vec<String> {
    ids.iter()
        .map(|id| ctx.world().name_of(*id).to_string())
        .collect()
}

/// Returns true if `target` is in view: held, in the room, or inside
/// something whose contents show.
fn can_see(world: &dyn WorldModel, actor: EntityId, target: EntityId) -> bool {
    let Some(room) = world.containing_room(actor) else {
        return false;
    };
    if target == room || target == actor {
        return true;
    }
    let mut current = target;
    for _ in 0..=world.entity_count() {
        let Some(parent) = world.location(current) else {
            return false;
        };
        if parent == actor || parent == room {
            return true;
        }
        if !world.reveals_contents(parent) {
            return false;
        }
        current = parent;
    }
    false
}

impl ExaminingAction {
    fn report_room(&self, ctx: &ActionContext<'_>) -> Vec<SemanticEvent> {
        let Some(room) = ctx.room() else {
            return vec![helpers::execution_failed(ctx, self.id(), "actor is not in a room")];
        };
        let world = ctx.world();
        let visible = visible_contents(ctx, room);
        let room_name = world.name_of(room);

        vec![
            helpers::domain_event(
                ctx,
                "looked",
                Value::map()
                    .with("roomId", room)
                    .with("roomName", room_name.clone()),
            ),
            helpers::domain_event(
                ctx,
                events::LOOKED,
                Value::map()
                    .with("room", helpers::room_snapshot(world, room))
                    .with("visibleItems", helpers::item_list(world, &visible)),
            ),
            helpers::success_event(
                ctx,
                self.id(),
                "room_description",
                Value::map()
                    .with("room", room_name)
                    .with("items", list_names(&names(ctx, &visible)))
                    .with(
                        "description",
                        world
                            .entity(room)
                            .and_then(|e| e.property("description"))
                            .cloned()
                            .unwrap_or(Value::Nil),
                    ),
            ),
        ]
    }
}

impl Action for ExaminingAction {
    fn id(&self) -> &str {
        actions::EXAMINING
    }

    fn group(&self) -> &str {
        "observation"
    }

    fn required_messages(&self) -> &'static [&'static str] {
        MESSAGES
    }

    fn validate(&self, ctx: &ActionContext<'_>) -> ValidationResult {
        let world = ctx.world();
        if ctx.room().is_none() {
            return ValidationResult::invalid("not_in_room");
        }
        match ctx.command.direct_object {
            None => ValidationResult::Valid,
            Some(target) if world.entity(target).is_none() => {
                ValidationResult::invalid("not_visible")
            }
            Some(target) if !can_see(world, ctx.actor(), target) => {
                ValidationResult::invalid("not_visible").with_param("item", world.name_of(target))
            }
            Some(_) => ValidationResult::Valid,
        }
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
        let Some(target) = ctx.command.direct_object else {
            return self.report_room(ctx);
        };
        let world = ctx.world();
        let name = world.name_of(target);
        let is_container = world.has_trait(target, &TraitType::Container)
            || world.has_trait(target, &TraitType::Supporter);
        let shown: Vec<EntityId> = if world.reveals_contents(target) {
            world.contents(target)
        } else {
            Vec::new()
        };
        let description = world
            .entity(target)
            .and_then(|e| e.property("description"))
            .cloned()
            .unwrap_or(Value::Nil);

        let mut params = Value::map()
            .with("item", name.clone())
            .with("description", description);
        let message = if shown.is_empty() {
            "examined"
        } else {
            params = params.with("contents", list_names(&names(ctx, &shown)));
            "examined_container"
        };

        vec![
            helpers::domain_event(
                ctx,
                "examined",
                Value::map()
                    .with("targetId", target)
                    .with("targetName", name),
            ),
            helpers::domain_event(
                ctx,
                events::EXAMINED,
                Value::map()
                    .with("target", helpers::snapshot(world, target))
                    .with("isContainer", is_container)
                    .with("isOpen", world.is_open(target))
                    .with("isLocked", world.is_locked(target))
                    .with("contents", helpers::item_list(world, &shown)),
            ),
            helpers::success_event(ctx, self.id(), message, params),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::testing::{Fixture, types};
    use parley_world::{EntitySpec, Trait};

    #[test]
    fn look_describes_room() {
        let mut fx = Fixture::new();
        fx.add(EntitySpec::new("lamp"), fx.room);
        let command = fx.command(actions::EXAMINING);

        let outcome = fx.run(&ExaminingAction, &command);
        assert_eq!(types(&outcome), vec!["looked", events::LOOKED, "action.success"]);
        let params = outcome.events[2].params().unwrap();
        assert_eq!(params.get("items").and_then(Value::as_str), Some("lamp"));
    }

    #[test]
    fn examine_open_container_lists_contents() {
        let mut fx = Fixture::new();
        let jar = fx.add(
            EntitySpec::new("jar")
                .with_trait(Trait::container())
                .with_trait(Trait::openable(true)),
            fx.room,
        );
        fx.add(EntitySpec::new("coin"), jar);
        let command = fx.command(actions::EXAMINING).with_direct_object(jar);

        let outcome = fx.run(&ExaminingAction, &command);
        assert_eq!(outcome.events[2].message_id(), Some("examined_container"));
    }

    #[test]
    fn hidden_things_are_not_visible() {
        let mut fx = Fixture::new();
        let chest = fx.add(
            EntitySpec::new("chest")
                .with_trait(Trait::container())
                .with_trait(Trait::openable(false)),
            fx.room,
        );
        let gem = fx.add(EntitySpec::new("gem"), chest);
        let command = fx.command(actions::EXAMINING).with_direct_object(gem);

        let outcome = fx.run(&ExaminingAction, &command);
        assert_eq!(outcome.events[0].error_code(), Some("not_visible"));
    }
}

//! Moving between rooms.

use parley_foundation::{EntityId, Value};
use parley_grammar::stdlib::actions;
use parley_world::{Trait, TraitType, WorldModel};

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::events;
use crate::validation::{ExecutionError, ValidationResult};

/// `go :direction`, or a bare direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct GoingAction;

const MESSAGES: &[&str] = &[
    "no_direction",
    "not_in_room",
    "no_exits",
    "no_exit_that_way",
    "door_closed",
    "door_locked",
    "moved",
];

/// Where a direction leads from the actor's room.
struct Route {
    from: EntityId,
    to: EntityId,
    door: Option<EntityId>,
}

fn route(world: &dyn WorldModel, actor: EntityId, direction: &str) -> Result<Route, ValidationResult> {
    let Some(from) = world.containing_room(actor) else {
        return Err(ValidationResult::invalid("not_in_room"));
    };
    let Some(Trait::Room { exits }) = world.get_trait(from, &TraitType::Room) else {
        return Err(ValidationResult::invalid("not_in_room"));
    };
    if exits.is_empty() {
        return Err(ValidationResult::invalid("no_exits"));
    }
    let Some(exit) = exits.get(direction).copied() else {
        return Err(ValidationResult::invalid("no_exit_that_way").with_param("direction", direction));
    };

    match world.get_trait(exit, &TraitType::Door) {
        Some(Trait::Door { rooms }) => {
            let door_name = world.name_of(exit);
            if world.is_locked(exit) {
                return Err(ValidationResult::invalid("door_locked")
                    .with_param("door", door_name)
                    .with_param("direction", direction));
            }
            if !world.is_open(exit) {
                return Err(ValidationResult::invalid("door_closed")
                    .with_param("door", door_name)
                    .with_param("direction", direction));
            }
            let to = if rooms.0 == from { rooms.1 } else { rooms.0 };
            Ok(Route {
                from,
                to,
                door: Some(exit),
            })
        }
        _ => Ok(Route {
            from,
            to: exit,
            door: None,
        }),
    }
}

impl Action for GoingAction {
    fn id(&self) -> &str {
        actions::GOING
    }

    fn group(&self) -> &str {
        "movement"
    }

    fn required_messages(&self) -> &'static [&'static str] {
        MESSAGES
    }

    fn validate(&self, ctx: &ActionContext<'_>) -> ValidationResult {
        let Some(direction) = ctx.command.direction() else {
            return ValidationResult::invalid("no_direction");
        };
        match route(ctx.world(), ctx.actor(), &direction) {
            Ok(_) => ValidationResult::Valid,
            Err(invalid) => invalid,
        }
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError> {
        let direction = ctx
            .command
            .direction()
            .ok_or_else(|| ExecutionError::MissingSlot("direction".into()))?;
        let path = route(ctx.world(), ctx.actor(), &direction).map_err(|invalid| {
            ExecutionError::Failed(invalid.error().unwrap_or("no route").to_string())
        })?;

        let actor = ctx.actor();
        ctx.world_mut().move_entity(actor, path.to)?;
        ctx.stash("direction", direction);
        ctx.stash("from", path.from);
        ctx.stash("to", path.to);
        ctx.stash("door", path.door);
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
        let direction = ctx.stashed("direction").cloned().unwrap_or(Value::Nil);
        let from = ctx.stashed("from").and_then(Value::as_entity);
        let to = ctx.stashed("to").and_then(Value::as_entity);
        let (Some(from), Some(to)) = (from, to) else {
            return vec![helpers::execution_failed(ctx, self.id(), "no route to report")];
        };

        let data = Value::map()
            .with("direction", direction.clone())
            .with("fromRoomId", from)
            .with("toRoomId", to);

        vec![
            helpers::domain_event(ctx, "went", data.clone()),
            helpers::domain_event(
                ctx,
                events::WENT,
                data.with("viaDoor", ctx.stashed("door").cloned().unwrap_or(Value::Nil))
                    .with("sourceRoom", helpers::snapshot(world, from))
                    .with("destinationRoom", helpers::room_snapshot(world, to)),
            ),
            helpers::success_event(
                ctx,
                self.id(),
                "moved",
                Value::map()
                    .with("direction", direction)
                    .with("room", world.name_of(to)),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ResolvedCommand;
    use crate::standard::testing::{Fixture, types};
    use parley_grammar::{SemanticProperties, SlotMatch, SlotType, TypedSlotValue};
    use parley_world::EntitySpec;

    fn north(fx: &Fixture) -> ResolvedCommand {
        fx.command(actions::GOING).with_slot(
            "direction",
            SlotMatch::new(vec![0], "north", SlotType::Direction)
                .with_value(TypedSlotValue::Direction("north".into())),
        )
    }

    #[test]
    fn walks_through_open_exit() {
        let mut fx = Fixture::new();
        let garden = fx
            .world
            .create_entity(EntitySpec::new("garden").with_trait(Trait::room()), None)
            .unwrap();
        fx.world.connect(fx.room, "north", garden).unwrap();

        let command = north(&fx);
        let outcome = fx.run(&GoingAction, &command);
        assert_eq!(types(&outcome), vec!["went", events::WENT, "action.success"]);
        assert_eq!(fx.world.location(fx.player), Some(garden));
    }

    #[test]
    fn doors_block_when_closed_or_locked() {
        let mut fx = Fixture::new();
        let garden = fx
            .world
            .create_entity(EntitySpec::new("garden").with_trait(Trait::room()), None)
            .unwrap();
        let door = fx.add(
            EntitySpec::new("gate")
                .with_trait(Trait::Door { rooms: (fx.room, garden) })
                .with_trait(Trait::openable(false)),
            fx.room,
        );
        fx.world.connect(fx.room, "north", door).unwrap();

        let command = north(&fx);
        assert_eq!(fx.run(&GoingAction, &command).events[0].error_code(), Some("door_closed"));

        fx.world.set_open(door, true).unwrap();
        let outcome = fx.run(&GoingAction, &command);
        assert!(outcome.succeeded());
        assert_eq!(fx.world.location(fx.player), Some(garden));
    }

    #[test]
    fn refusals() {
        let mut fx = Fixture::new();
        let nowhere = fx.command(actions::GOING);
        assert_eq!(fx.run(&GoingAction, &nowhere).events[0].error_code(), Some("no_direction"));

        let command = north(&fx);
        assert_eq!(fx.run(&GoingAction, &command).events[0].error_code(), Some("no_exits"));

        let cellar = fx
            .world
            .create_entity(EntitySpec::new("cellar").with_trait(Trait::room()), None)
            .unwrap();
        fx.world.connect(fx.room, "down", cellar).unwrap();
        assert_eq!(
            fx.run(&GoingAction, &command).events[0].error_code(),
            Some("no_exit_that_way")
        );

        let down = fx
            .command(actions::GOING)
            .with_semantics(SemanticProperties::new().with_direction("down"));
        assert!(fx.run(&GoingAction, &down).succeeded());
    }
}

//! Picking things up.

use parley_foundation::Value;
use parley_grammar::stdlib::actions;
use parley_world::{TraitType, WorldModel};

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::events;
use crate::validation::{ExecutionError, ValidationResult};

/// `take :items`. Runs once per item of a multi-object command.
#[derive(Clone, Copy, Debug, Default)]
pub struct TakingAction;

const MESSAGES: &[&str] = &[
    "no_target",
    "cant_take_self",
    "already_have",
    "cant_take_room",
    "cant_take_person",
    "fixed_in_place",
    "cant_reach",
    "taken",
    "taken_from",
];

impl Action for TakingAction {
    fn id(&self) -> &str {
        actions::TAKING
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
        let actor = ctx.actor();
        let name = item.name.as_ref();

        if item.id == actor {
            return ValidationResult::invalid("cant_take_self");
        }
        if helpers::is_held(world, actor, item.id) {
            return ValidationResult::invalid("already_have").with_param("item", name);
        }
        if item.has_trait(&TraitType::Room) {
            return ValidationResult::invalid("cant_take_room").with_param("item", name);
        }
        if item.has_trait(&TraitType::Actor) {
            return ValidationResult::invalid("cant_take_person").with_param("item", name);
        }
        if item.has_trait(&TraitType::Scenery) || item.has_trait(&TraitType::Door) {
            return ValidationResult::invalid("fixed_in_place").with_param("item", name);
        }
        if !helpers::can_reach(world, actor, item.id) {
            return ValidationResult::invalid("cant_reach").with_param("item", name);
        }
        ValidationResult::Valid
    }

    fn execute(&self, ctx: &mut ActionContext<'_>) -> Result<(), ExecutionError> {
        let item = ctx
            .command
            .direct_object
            .ok_or_else(|| ExecutionError::MissingSlot("item".into()))?;
        let actor = ctx.actor();
        let previous = ctx.world().location(item);

        ctx.world_mut().move_entity(item, actor)?;
        ctx.stash("previous_location", previous);
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
        let actor = ctx.actor();
        let name = world.name_of(item);
        let previous = ctx.stashed("previous_location").and_then(Value::as_entity);
        let from_container = previous.filter(|p| Some(*p) != ctx.room());

        let taken = helpers::domain_event(
            ctx,
            "taken",
            Value::map()
                .with("itemId", item)
                .with("itemName", name.clone()),
        );

        let mut rich = Value::map()
            .with("item", name.clone())
            .with("itemId", item)
            .with("actor", world.name_of(actor))
            .with("actorId", actor)
            .with("previousLocation", previous)
            .with("fromContainer", from_container.is_some())
            .with("itemSnapshot", helpers::snapshot(world, item));
        if let Some(source) = from_container {
            rich = rich.with("container", world.name_of(source));
        }
        let taken_rich = helpers::domain_event(ctx, events::TAKEN, rich);

        let success = match from_container {
            Some(source) => helpers::success_event(
                ctx,
                self.id(),
                "taken_from",
                Value::map()
                    .with("item", name)
                    .with("container", world.name_of(source)),
            ),
            None => helpers::success_event(ctx, self.id(), "taken", Value::map().with("item", name)),
        };

        vec![taken, taken_rich, success]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::testing::{Fixture, types};
    use parley_world::{EntitySpec, Trait};

    #[test]
    fn takes_from_floor() {
        let mut fx = Fixture::new();
        let lamp = fx.add(EntitySpec::new("lamp"), fx.room);
        let command = fx.command(actions::TAKING).with_direct_object(lamp);

        let outcome = fx.run(&TakingAction, &command);
        assert_eq!(types(&outcome), vec!["taken", events::TAKEN, "action.success"]);
        assert_eq!(outcome.events[2].message_id(), Some("taken"));
        assert_eq!(fx.world.location(lamp), Some(fx.player));

        let again = fx.run(&TakingAction, &command);
        assert_eq!(again.events[0].error_code(), Some("already_have"));
    }

    #[test]
    fn takes_from_open_container() {
        let mut fx = Fixture::new();
        let jar = fx.add(
            EntitySpec::new("jar")
                .with_trait(Trait::container())
                .with_trait(Trait::openable(true)),
            fx.room,
        );
        let coin = fx.add(EntitySpec::new("coin"), jar);
        let command = fx.command(actions::TAKING).with_direct_object(coin);

        let outcome = fx.run(&TakingAction, &command);
        assert_eq!(outcome.events[2].message_id(), Some("taken_from"));
        assert_eq!(outcome.events[1].get("fromContainer"), Some(&Value::Bool(true)));
    }

    #[test]
    fn refusals() {
        let mut fx = Fixture::new();
        let statue = fx.add(EntitySpec::new("statue").with_trait(Trait::Scenery), fx.room);
        let guard = fx.add(
            EntitySpec::new("guard").with_trait(Trait::Actor { is_player: false }),
            fx.room,
        );
        let cases = [
            (fx.player, "cant_take_self"),
            (fx.room, "cant_take_room"),
            (guard, "cant_take_person"),
            (statue, "fixed_in_place"),
        ];
        for (target, code) in cases {
            let command = fx.command(actions::TAKING).with_direct_object(target);
            let outcome = fx.run(&TakingAction, &command);
            assert_eq!(outcome.events[0].error_code(), Some(code));
        }
        assert_eq!(fx.world.location(statue), Some(fx.room));
    }
}

//! Opening containers and doors.

use parley_foundation::{EntityId, Value};
use parley_grammar::stdlib::actions;
use parley_world::{TraitType, WorldModel};

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::events;
use crate::validation::{ExecutionError, ValidationResult};

/// `open :target`.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpeningAction;

const MESSAGES: &[&str] = &[
    "no_target",
    "not_openable",
    "already_open",
    "locked",
    "cant_reach",
    "opened",
    "its_empty",
    "revealing",
];

impl Action for OpeningAction {
    fn id(&self) -> &str {
        actions::OPENING
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
            return ValidationResult::invalid("not_openable").with_param("item", name);
        }
        if world.is_open(target.id) {
            return ValidationResult::invalid("already_open").with_param("item", name);
        }
        if world.is_locked(target.id) {
            return ValidationResult::invalid("locked").with_param("item", name);
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

        let world = ctx.world();
        let is_container = world.has_trait(target, &TraitType::Container);
        let is_door = world.has_trait(target, &TraitType::Door);
        let contents: Vec<EntityId> = if is_container {
            world.contents(target)
        } else {
            Vec::new()
        };

        ctx.world_mut().set_open(target, true)?;

        ctx.stash("is_container", is_container);
        ctx.stash("is_door", is_door);
        ctx.stash("had_contents", !contents.is_empty());
        ctx.stash("revealed_items", contents);
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
        let is_container = ctx.stashed_flag("is_container");
        let had_contents = ctx.stashed_flag("had_contents");
        let revealed: Vec<EntityId> = ctx
            .stashed("revealed_items")
            .and_then(Value::as_vec)
            .map(|items| items.iter().filter_map(Value::as_entity).collect())
            .unwrap_or_default();

        let opened = helpers::domain_event(
            ctx,
            "opened",
            Value::map()
                .with("targetId", target)
                .with("targetName", name.clone()),
        );

        let mut rich = Value::map()
            .with("targetId", target)
            .with("targetName", name.clone())
            .with("item", name.clone())
            .with("isContainer", is_container)
            .with("isDoor", ctx.stashed_flag("is_door"))
            .with("hasContents", had_contents)
            .with("revealedItems", helpers::item_list(world, &revealed))
            .with("target", helpers::snapshot(world, target));
        if let Some(room) = ctx.room() {
            rich = rich.with("room", helpers::room_snapshot(world, room));
        }
        let opened_rich = helpers::domain_event(ctx, events::OPENED, rich);

        let success = if is_container && !had_contents {
            helpers::success_event(
                ctx,
                self.id(),
                "its_empty",
                Value::map().with("container", name),
            )
        } else {
            helpers::success_event(ctx, self.id(), "opened", Value::map().with("item", name))
        };

        vec![opened, opened_rich, success]
    }
}

//! Unlocking, and the key checks shared with locking.

use parley_foundation::{EntityId, Value};
use parley_grammar::stdlib::actions;
use parley_world::{Entity, Trait, TraitType, WorldModel};

use crate::action::Action;
use crate::context::ActionContext;
use crate::event::SemanticEvent;
use crate::helpers;
use crate::standard::events;
use crate::validation::{ExecutionError, ValidationResult};

/// `unlock :target [with :key]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnlockingAction;

const MESSAGES: &[&str] = &[
    "no_target",
    "not_lockable",
    "already_unlocked",
    "no_key",
    "wrong_key",
    "key_not_held",
    "cant_reach",
    "unlocked",
    "unlocked_with",
];

/// The key a lock requires, if any.
pub(super) fn required_key(target: &Entity) -> Option<EntityId> {
    match target.get_trait(&TraitType::Lockable) {
        Some(Trait::Lockable { key, .. }) => *key,
        _ => None,
    }
}

/// Checks the instrument against the lock's key.
///
/// Locks without a key accept any instrument or none.
pub(super) fn check_key(ctx: &ActionContext<'_>, target: &Entity) -> Option<ValidationResult> {
    let required = required_key(target)?;
    let world = ctx.world();
    let name = target.name.as_ref();

    let Some(key) = ctx.command.instrument else {
        return Some(ValidationResult::invalid("no_key").with_param("item", name));
    };
    let key_name = world.name_of(key);
    if key != required {
        return Some(
            ValidationResult::invalid("wrong_key")
                .with_param("item", name)
                .with_param("key", key_name),
        );
    }
    if !helpers::is_held(world, ctx.actor(), key) {
        return Some(ValidationResult::invalid("key_not_held").with_param("key", key_name));
    }
    None
}

/// Success params shared by locking and unlocking.
pub(super) fn lock_params(ctx: &ActionContext<'_>, target: EntityId) -> (bool, Value) {
    let world = ctx.world();
    let mut params = Value::map().with("item", world.name_of(target));
    let with_key = ctx.command.instrument.is_some();
    if let Some(key) = ctx.command.instrument {
        params = params.with("key", world.name_of(key));
    }
    (with_key, params)
}

impl Action for UnlockingAction {
    fn id(&self) -> &str {
        actions::UNLOCKING
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
        if !world.is_locked(target.id) {
            return ValidationResult::invalid("already_unlocked").with_param("item", name);
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
        ctx.world_mut().set_locked(target, false)?;
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
            helpers::domain_event(ctx, "unlocked", data.clone()),
            helpers::domain_event(
                ctx,
                events::UNLOCKED,
                data.with("target", helpers::snapshot(world, target)),
            ),
            helpers::success_event(
                ctx,
                self.id(),
                if with_key { "unlocked_with" } else { "unlocked" },
                params,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standard::testing::{Fixture, types};
    use parley_world::EntitySpec;

    fn door_with_key(fx: &mut Fixture) -> (EntityId, EntityId, EntityId) {
        let key = fx.add(EntitySpec::new("brass key"), fx.player);
        let other = fx.add(EntitySpec::new("iron key"), fx.player);
        let door = fx.add(
            EntitySpec::new("door")
                .with_trait(Trait::openable(false))
                .with_trait(Trait::lockable(true, Some(key))),
            fx.room,
        );
        (door, key, other)
    }

    #[test]
    fn unlock_with_right_key() {
        let mut fx = Fixture::new();
        let (door, key, _) = door_with_key(&mut fx);
        let command = fx
            .command(actions::UNLOCKING)
            .with_direct_object(door)
            .with_instrument(key);

        let outcome = fx.run(&UnlockingAction, &command);
        assert_eq!(types(&outcome), vec!["unlocked", events::UNLOCKED, "action.success"]);
        assert_eq!(outcome.events[2].message_id(), Some("unlocked_with"));
        assert!(!fx.world.is_locked(door));
    }

    #[test]
    fn key_refusals() {
        let mut fx = Fixture::new();
        let (door, key, other) = door_with_key(&mut fx);

        let no_key = fx.command(actions::UNLOCKING).with_direct_object(door);
        assert_eq!(fx.run(&UnlockingAction, &no_key).events[0].error_code(), Some("no_key"));

        let wrong = no_key.clone().with_instrument(other);
        assert_eq!(fx.run(&UnlockingAction, &wrong).events[0].error_code(), Some("wrong_key"));

        fx.world.move_entity(key, fx.room).unwrap();
        let dropped = no_key.with_instrument(key);
        assert_eq!(
            fx.run(&UnlockingAction, &dropped).events[0].error_code(),
            Some("key_not_held")
        );
        assert!(fx.world.is_locked(door));
    }

    #[test]
    fn keyless_lock_and_already_unlocked() {
        let mut fx = Fixture::new();
        let latch = fx.add(
            EntitySpec::new("latch").with_trait(Trait::lockable(true, None)),
            fx.room,
        );
        let command = fx.command(actions::UNLOCKING).with_direct_object(latch);

        let outcome = fx.run(&UnlockingAction, &command);
        assert_eq!(outcome.events[2].message_id(), Some("unlocked"));

        let again = fx.run(&UnlockingAction, &command);
        assert_eq!(again.events[0].error_code(), Some("already_unlocked"));
    }

    #[test]
    fn not_lockable() {
        let mut fx = Fixture::new();
        let rock = fx.add(EntitySpec::new("rock"), fx.room);
        let command = fx.command(actions::UNLOCKING).with_direct_object(rock);
        assert_eq!(
            fx.run(&UnlockingAction, &command).events[0].error_code(),
            Some("not_lockable")
        );
    }
}

//! Shared building blocks for actions: reachability, snapshots and the
//! standard error and success events.

use parley_foundation::{EntityId, Value};
use parley_world::{TraitType, WorldModel};

use crate::context::ActionContext;
use crate::event::{ACTION_ERROR, ACTION_SUCCESS, EventDraft, SemanticEvent};
use crate::validation::{ExecutionError, ValidationResult};

/// Error code for execution faults.
pub const EXECUTION_FAILED: &str = "execution_failed";

// =============================================================================
// World Queries
// =============================================================================

/// Returns true if `actor` can touch `target`.
///
/// Walks up from the target. Reaching the actor or the actor's room succeeds;
/// passing through a closed container fails.
#[must_use]
pub fn can_reach(world: &dyn WorldModel, actor: EntityId, target: EntityId) -> bool {
    if target == actor {
        return true;
    }
    let Some(room) = world.containing_room(actor) else {
        return false;
    };
    if target == room {
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
        if world.has_trait(parent, &TraitType::Container) && !world.is_open(parent) {
            return false;
        }
        current = parent;
    }
    false
}

/// Returns true if `actor` directly holds `item`.
#[must_use]
pub fn is_held(world: &dyn WorldModel, actor: EntityId, item: EntityId) -> bool {
    world.location(item) == Some(actor)
}

/// Display name of an entity.
#[must_use]
pub fn name(world: &dyn WorldModel, id: EntityId) -> Value {
    Value::from(world.name_of(id))
}

// =============================================================================
// Snapshots
// =============================================================================

/// Snapshot of an entity, with its location. Nil for unknown ids.
#[must_use]
pub fn snapshot(world: &dyn WorldModel, id: EntityId) -> Value {
    world.entity(id).map_or(Value::Nil, |entity| {
        entity
            .snapshot()
            .with("location", world.location(id))
            .with("isOpen", world.is_open(id))
    })
}

/// Snapshot of a room, listing its direct contents by name.
#[must_use]
pub fn room_snapshot(world: &dyn WorldModel, room: EntityId) -> Value {
    let contents: Vec<Value> = world
        .contents(room)
        .into_iter()
        .map(|id| name(world, id))
        .collect();
    snapshot(world, room).with("contents", contents)
}

/// `[{entityId, name}]` for a list of entities.
#[must_use]
pub fn item_list(world: &dyn WorldModel, ids: &[EntityId]) -> Value {
    let items: Vec<Value> = ids
        .iter()
        .map(|id| {
            Value::map()
                .with("entityId", *id)
                .with("name", world.name_of(*id))
        })
        .collect();
    Value::from(items)
}

// =============================================================================
// Events
// =============================================================================

fn role_draft(ctx: &ActionContext<'_>, event_type: &str) -> EventDraft {
    let mut draft = EventDraft::new(event_type).with_actor(ctx.actor());
    if let Some(target) = ctx.command.direct_object {
        draft = draft.with_target(target);
    }
    if let Some(instrument) = ctx.command.instrument {
        draft = draft.with_instrument(instrument);
    }
    if let Some(room) = ctx.room() {
        draft = draft.with_location(room);
    }
    draft
}

/// An `action.error` event.
#[must_use]
pub fn error_event(
    ctx: &ActionContext<'_>,
    action_id: &str,
    error: &str,
    message_id: &str,
    params: Value,
) -> SemanticEvent {
    ctx.emit(
        role_draft(ctx, ACTION_ERROR)
            .with("actionId", action_id)
            .with("error", error)
            .with("messageId", message_id)
            .with("params", params),
    )
}

/// An `action.error` event for a failed validation.
#[must_use]
pub fn blocked(
    ctx: &ActionContext<'_>,
    action_id: &str,
    validation: &ValidationResult,
) -> Option<SemanticEvent> {
    match validation {
        ValidationResult::Valid => None,
        ValidationResult::Invalid {
            error,
            message_id,
            params,
        } => Some(error_event(ctx, action_id, error, message_id, params.clone())),
    }
}

/// An `action.error` event for an execution fault.
#[must_use]
pub fn execution_failed(ctx: &ActionContext<'_>, action_id: &str, reason: &str) -> SemanticEvent {
    error_event(
        ctx,
        action_id,
        EXECUTION_FAILED,
        EXECUTION_FAILED,
        Value::map().with("reason", reason),
    )
}

/// The failure events for a report call, or `None` on the success path.
///
/// Every action's `report` starts with this, which keeps the failure paths
/// identical across actions.
#[must_use]
pub fn failure_events(
    ctx: &ActionContext<'_>,
    action_id: &str,
    validation: Option<&ValidationResult>,
    error: Option<&ExecutionError>,
) -> Option<Vec<SemanticEvent>> {
    if let Some(event) = validation.and_then(|v| blocked(ctx, action_id, v)) {
        return Some(vec![event]);
    }
    error.map(|err| vec![execution_failed(ctx, action_id, &err.to_string())])
}

/// An `action.success` event.
#[must_use]
pub fn success_event(
    ctx: &ActionContext<'_>,
    action_id: &str,
    message_id: &str,
    params: Value,
) -> SemanticEvent {
    ctx.emit(
        role_draft(ctx, ACTION_SUCCESS)
            .with("actionId", action_id)
            .with("messageId", message_id)
            .with("params", params),
    )
}

/// A domain event with the command's roles filled in.
#[must_use]
pub fn domain_event(ctx: &ActionContext<'_>, event_type: &str, data: Value) -> SemanticEvent {
    ctx.emit(role_draft(ctx, event_type).with_data(data))
}

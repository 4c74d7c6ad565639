//! Opening a container reveals what is inside.

use parley_foundation::{EntityId, Value};
use parley_world::{TraitType, WorldModel};

use crate::event::{EventDraft, SemanticEvent};
use crate::helpers;
use crate::standard::events;

/// Key of the standard opened to revealed chain.
pub const OPENED_REVEALED_CHAIN: &str = "stdlib.chain.opened-revealed";

/// Derives `if.event.revealed` from `if.event.opened`.
///
/// Nothing is derived for non-containers, empty containers, or when the
/// opened target no longer exists.
#[must_use]
pub fn opened_revealed(event: &SemanticEvent, world: &dyn WorldModel) -> Option<EventDraft> {
    let target: EntityId = event
        .get("targetId")
        .and_then(Value::as_entity)
        .or(event.entities.target)?;
    let container = world.entity(target)?;
    if !container.has_trait(&TraitType::Container) {
        return None;
    }
    let items = world.contents(target);
    if items.is_empty() {
        return None;
    }

    let mut draft = EventDraft::new(events::REVEALED)
        .with_target(target)
        .with("containerId", target)
        .with("containerName", container.name.as_ref())
        .with("items", helpers::item_list(world, &items));
    if let Some(actor) = event.entities.actor {
        draft = draft.with_actor(actor);
    }
    for item in items {
        draft = draft.with_other(item);
    }
    Some(draft)
}

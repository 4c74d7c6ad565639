//! Message templates for rendering events as text.
//!
//! Templates are plain strings with `{param}` placeholders. Action messages
//! are looked up as `"<action id>.<message id>"` first, then as the bare
//! message id, so one action can override a shared wording. Other events
//! (chain-derived ones such as `if.event.revealed`) render from a separate
//! table keyed by event type, or through a message id linked to their type.

use std::collections::HashMap;

use parley_actions::{ACTION_ERROR, ACTION_SUCCESS, SemanticEvent};
use parley_foundation::Value;

/// Message id to template.
#[derive(Clone, Debug, Default)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
    event_templates: HashMap<String, String>,
    event_messages: HashMap<String, String>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The English texts for the standard actions and resolution failures.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (id, template) in STANDARD_MESSAGES {
            catalog.insert(id, template);
        }
        for (event_type, message_id) in STANDARD_EVENT_MESSAGES {
            catalog.link_event(event_type, message_id);
        }
        catalog
    }

    /// Adds or replaces a template.
    pub fn insert(&mut self, id: &str, template: &str) {
        self.templates.insert(id.to_string(), template.to_string());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, id: &str, template: &str) -> Self {
        self.insert(id, template);
        self
    }

    /// Adds or replaces the template for events of `event_type`.
    pub fn insert_event(&mut self, event_type: &str, template: &str) {
        self.event_templates
            .insert(event_type.to_string(), template.to_string());
    }

    /// Builder form of [`insert_event`](Self::insert_event).
    #[must_use]
    pub fn with_event(mut self, event_type: &str, template: &str) -> Self {
        self.insert_event(event_type, template);
        self
    }

    /// Renders events of `event_type` with the message `message_id`, using
    /// the event data as params. An event-type template takes precedence.
    pub fn link_event(&mut self, event_type: &str, message_id: &str) {
        self.event_messages
            .insert(event_type.to_string(), message_id.to_string());
    }

    /// Returns true if a template exists for `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// The template for `id` with `{param}` placeholders filled from the
    /// map `params`.
    ///
    /// Placeholders without a matching param are left as written.
    #[must_use]
    pub fn message(&self, id: &str, params: &Value) -> Option<String> {
        self.templates.get(id).map(|t| substitute(t, params))
    }

    /// Text for an event, if the catalog knows it.
    ///
    /// `action.success` and `action.error` events render their `messageId`
    /// with their `params`; any other event renders its event-type template
    /// with its data as params.
    #[must_use]
    pub fn render(&self, event: &SemanticEvent) -> Option<String> {
        if event.is(ACTION_SUCCESS) || event.is(ACTION_ERROR) {
            let message_id = event.message_id()?;
            let params = event.params().cloned().unwrap_or(Value::Nil);
            if let Some(action) = event.get("actionId").and_then(Value::as_str) {
                if let Some(text) = self.message(&format!("{action}.{message_id}"), &params) {
                    return Some(text);
                }
            }
            return self.message(message_id, &params);
        }
        if let Some(template) = self.event_templates.get(&event.event_type) {
            return Some(substitute(template, &event.data));
        }
        let message_id = self.event_messages.get(&event.event_type)?;
        self.message(message_id, &event.data)
    }

    /// Rendered texts for a turn's events, in order.
    #[must_use]
    pub fn render_all(&self, events: &[SemanticEvent]) -> Vec<String> {
        events.iter().filter_map(|e| self.render(e)).collect()
    }
}

fn substitute(template: &str, params: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = &after[..close];
        match params.get(key) {
            Some(value) => out.push_str(&param_text(value)),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Lists of `{name}` maps read as "a, b"; everything else as its display
/// form.
fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        Value::Nil => String::new(),
        Value::Vec(items) => items
            .iter()
            .map(|item| {
                item.get("name")
                    .map_or_else(|| param_text(item), param_text)
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

const STANDARD_MESSAGES: &[(&str, &str)] = &[
    // Resolution
    ("empty_input", "I beg your pardon?"),
    ("unknown_command", "I don't understand \"{input}\"."),
    ("no_target", "You can't see any {text} here."),
    ("ambiguous_target", "Which do you mean: {candidates}?"),
    ("unknown_action", "Nothing happens."),
    ("execution_failed", "Something went wrong."),
    // Shared
    ("cant_reach", "You can't reach the {item}."),
    ("not_in_room", "You aren't anywhere."),
    ("no_key", "You need a key to do that to the {item}."),
    ("wrong_key", "The {key} doesn't fit the {item}."),
    ("key_not_held", "You aren't holding the {key}."),
    // Opening and closing
    ("if.action.opening.no_target", "Open what?"),
    ("not_openable", "The {item} can't be opened."),
    ("already_open", "The {item} is already open."),
    ("locked", "The {item} is locked."),
    ("opened", "You open the {item}."),
    ("its_empty", "You open the {container}. It's empty."),
    ("revealing", "Opening the {containerName} reveals {items}."),
    ("if.action.closing.no_target", "Close what?"),
    ("not_closable", "The {item} can't be closed."),
    ("already_closed", "The {item} is already closed."),
    ("closed", "You close the {item}."),
    // Locks
    ("if.action.locking.no_target", "Lock what?"),
    ("if.action.unlocking.no_target", "Unlock what?"),
    ("not_lockable", "The {item} has no lock."),
    ("already_locked", "The {item} is already locked."),
    ("already_unlocked", "The {item} is already unlocked."),
    ("not_closed", "You'll have to close the {item} first."),
    ("if.action.locking.locked", "You lock the {item}."),
    ("locked_with", "You lock the {item} with the {key}."),
    ("unlocked", "You unlock the {item}."),
    ("unlocked_with", "You unlock the {item} with the {key}."),
    // Taking and dropping
    ("if.action.taking.no_target", "Take what?"),
    ("cant_take_self", "You can't take yourself."),
    ("already_have", "You already have the {item}."),
    ("cant_take_room", "You can't take the {item}."),
    ("cant_take_person", "The {item} wouldn't like that."),
    ("fixed_in_place", "The {item} is fixed in place."),
    ("taken", "Taken."),
    ("taken_from", "You take the {item} from the {container}."),
    ("if.action.dropping.no_target", "Drop what?"),
    ("not_held", "You aren't holding the {item}."),
    ("cant_drop_here", "You can't drop things here."),
    ("dropped", "Dropped."),
    // Putting
    ("if.action.putting.no_target", "Put what?"),
    ("no_destination", "Put it where?"),
    ("cant_put_in_itself", "You can't put something inside itself."),
    ("cant_put_on_itself", "You can't put something on itself."),
    ("already_there", "It's already there."),
    ("not_container", "You can't put things in that."),
    ("not_surface", "You can't put things on that."),
    ("container_closed", "The {container} is closed."),
    ("no_room", "There's no room in the {container}."),
    ("no_space", "There's no space on the {surface}."),
    ("put_in", "You put the {item} in the {container}."),
    ("put_on", "You put the {item} on the {surface}."),
    // Observation
    ("not_visible", "You can't see that."),
    ("examined", "{description}"),
    ("examined_container", "{description} It contains {contents}."),
    ("room_description", "{room}\n{description}\nYou can see {items}."),
    ("carrying", "You are carrying {items}."),
    ("empty_handed", "You are empty-handed."),
    // Movement
    ("no_direction", "Go where?"),
    ("no_exits", "There's no way out."),
    ("no_exit_that_way", "You can't go {direction}."),
    ("door_closed", "The {door} is closed."),
    ("door_locked", "The {door} is locked."),
    ("moved", "You go {direction}."),
];

/// Event type to message id.
const STANDARD_EVENT_MESSAGES: &[(&str, &str)] = &[("if.event.revealed", "revealing")];

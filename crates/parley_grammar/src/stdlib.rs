//! Standard grammar for adventure games.
//!
//! Rules for the standard actions: taking, dropping, putting, opening,
//! closing, locking, unlocking, examining, inventory and going.

use parley_foundation::Result;
use parley_world::TraitType;

use crate::engine::GrammarEngine;
use crate::rule::{GrammarRule, RuleBuilder, SemanticProperties};

/// Standard action ids.
pub mod actions {
    /// Take something.
    pub const TAKING: &str = "if.action.taking";
    /// Drop something held.
    pub const DROPPING: &str = "if.action.dropping";
    /// Put something in or on something.
    pub const PUTTING: &str = "if.action.putting";
    /// Open something.
    pub const OPENING: &str = "if.action.opening";
    /// Close something.
    pub const CLOSING: &str = "if.action.closing";
    /// Lock something.
    pub const LOCKING: &str = "if.action.locking";
    /// Unlock something.
    pub const UNLOCKING: &str = "if.action.unlocking";
    /// Look at something, or around.
    pub const EXAMINING: &str = "if.action.examining";
    /// List what the actor carries.
    pub const INVENTORY: &str = "if.action.inventory";
    /// Walk in a direction.
    pub const GOING: &str = "if.action.going";
}

/// Priority of bare direction commands ("north"), below verb-led rules.
pub const BARE_DIRECTION_PRIORITY: i32 = 90;

fn in_relation(rule: RuleBuilder) -> RuleBuilder {
    ["in", "into", "inside"]
        .into_iter()
        .fold(rule, |r, p| r.with_semantic_preposition(p, "in"))
}

/// The standard rules, unregistered.
#[must_use]
pub fn standard_rules() -> Vec<RuleBuilder> {
    vec![
        // Taking
        GrammarRule::define("take|get|grab :items")
            .where_scope("items", |s| {
                s.touchable();
            })
            .maps_to(actions::TAKING)
            .with_key("stdlib.taking")
            .with_semantic_verb("grab", SemanticProperties::new().with_manner("quick")),
        GrammarRule::define("pick up :items")
            .where_scope("items", |s| {
                s.touchable();
            })
            .maps_to(actions::TAKING)
            .with_key("stdlib.taking.pick-up"),
        // Dropping
        GrammarRule::define("drop|discard :items")
            .where_scope("items", |s| {
                s.carried();
            })
            .maps_to(actions::DROPPING)
            .with_key("stdlib.dropping"),
        // Putting
        in_relation(
            GrammarRule::define("put|place|insert :item in|into|inside :container")
                .where_scope("item", |s| {
                    s.carried();
                })
                .where_scope("container", |s| {
                    s.touchable().has_trait(TraitType::Container);
                })
                .maps_to(actions::PUTTING)
                .with_key("stdlib.putting.in")
                .with_priority(110),
        ),
        GrammarRule::define("put|place :item on|onto :supporter")
            .where_scope("item", |s| {
                s.carried();
            })
            .where_scope("supporter", |s| {
                s.touchable().has_trait(TraitType::Supporter);
            })
            .maps_to(actions::PUTTING)
            .with_key("stdlib.putting.on")
            .with_priority(110)
            .with_semantic_preposition("on", "on")
            .with_semantic_preposition("onto", "on"),
        // Opening and closing
        GrammarRule::define("open :target")
            .where_scope("target", |s| {
                s.touchable();
            })
            .maps_to(actions::OPENING)
            .with_key("stdlib.opening"),
        GrammarRule::define("close|shut :target")
            .where_scope("target", |s| {
                s.touchable();
            })
            .maps_to(actions::CLOSING)
            .with_key("stdlib.closing"),
        // Locks
        GrammarRule::define("unlock :target [with :key]")
            .where_scope("target", |s| {
                s.touchable();
            })
            .instrument("key")
            .where_scope("key", |s| {
                s.carried();
            })
            .maps_to(actions::UNLOCKING)
            .with_key("stdlib.unlocking"),
        GrammarRule::define("lock :target [with :key]")
            .where_scope("target", |s| {
                s.touchable();
            })
            .instrument("key")
            .where_scope("key", |s| {
                s.carried();
            })
            .maps_to(actions::LOCKING)
            .with_key("stdlib.locking"),
        // Looking
        GrammarRule::define("examine|x|inspect :target")
            .maps_to(actions::EXAMINING)
            .with_key("stdlib.examining"),
        GrammarRule::define("look at :target")
            .maps_to(actions::EXAMINING)
            .with_key("stdlib.examining.look-at"),
        GrammarRule::define("look|l")
            .maps_to(actions::EXAMINING)
            .with_key("stdlib.looking"),
        GrammarRule::define("inventory|i|inv")
            .maps_to(actions::INVENTORY)
            .with_key("stdlib.inventory"),
        // Movement
        GrammarRule::define("go|walk :direction")
            .direction("direction")
            .maps_to(actions::GOING)
            .with_key("stdlib.going"),
        GrammarRule::define(":direction")
            .direction("direction")
            .maps_to(actions::GOING)
            .with_key("stdlib.going.bare")
            .with_priority(BARE_DIRECTION_PRIORITY),
    ]
}

/// Registers the standard rules on an engine.
///
/// # Errors
///
/// Returns an error if a rule fails to build (never for the shipped rules).
pub fn register_standard_grammar<E: GrammarEngine>(engine: &mut E) -> Result<()> {
    engine.add_rules(standard_rules())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::english::EnglishGrammarEngine;

    #[test]
    fn standard_rules_all_build() {
        let mut engine = EnglishGrammarEngine::new();
        register_standard_grammar(&mut engine).unwrap();
        assert_eq!(engine.rules().len(), standard_rules().len());
        assert_eq!(engine.rules_for_action(actions::EXAMINING).len(), 3);
        assert_eq!(
            engine.rules().last().map(|r| r.priority),
            Some(BARE_DIRECTION_PRIORITY)
        );
    }

    #[test]
    fn registering_twice_replaces_by_key() {
        let mut engine = EnglishGrammarEngine::new();
        register_standard_grammar(&mut engine).unwrap();
        register_standard_grammar(&mut engine).unwrap();
        assert_eq!(engine.rules().len(), standard_rules().len());
    }
}

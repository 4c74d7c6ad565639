//! The built-in demo story.
//!
//! Two rooms joined by a locked oak door. The brass key lies on the hall
//! table; the study holds a closed chest with a letter in it.

use parley_foundation::Result;
use parley_grammar::stdlib::actions;
use parley_grammar::{GrammarEngine, GrammarRule, VocabularyDefinition};
use parley_world::{EntitySpec, Trait, World};

use crate::config::EngineConfig;
use crate::engine::CommandEngine;

/// Builds the demo story on a standard engine.
///
/// # Errors
///
/// Returns an error if the world or a story rule fails to build.
pub fn demo(config: EngineConfig) -> Result<CommandEngine> {
    let mut world = World::new();

    let hall = world.create_entity(
        EntitySpec::new("Hall")
            .with_trait(Trait::room())
            .with_property("description", "A draughty hall. An oak door leads north."),
        None,
    )?;
    let study = world.create_entity(
        EntitySpec::new("Study")
            .with_trait(Trait::room())
            .with_property("description", "Books line every wall."),
        None,
    )?;
    let player = world.create_entity(
        EntitySpec::new("yourself")
            .with_alias("me")
            .with_alias("self")
            .with_trait(Trait::Actor { is_player: true }),
        Some(hall),
    )?;

    let table = world.create_entity(
        EntitySpec::new("table")
            .with_adjective("hall")
            .with_trait(Trait::Supporter { capacity: Some(3) })
            .with_trait(Trait::Scenery),
        Some(hall),
    )?;
    let key = world.create_entity(
        EntitySpec::new("key")
            .with_adjective("brass")
            .with_property("description", "A small brass key."),
        Some(table),
    )?;
    world.create_entity(
        EntitySpec::new("jar")
            .with_adjective("glass")
            .with_trait(Trait::container())
            .with_trait(Trait::openable(true))
            .with_property("description", "An empty glass jar."),
        Some(hall),
    )?;
    world.create_entity(
        EntitySpec::new("coin")
            .with_adjective("gold")
            .with_property("description", "A gold coin."),
        Some(hall),
    )?;

    let door = world.create_entity(
        EntitySpec::new("door")
            .with_adjective("oak")
            .with_trait(Trait::Door {
                rooms: (hall, study),
            })
            .with_trait(Trait::openable(false))
            .with_trait(Trait::lockable(true, Some(key))),
        Some(hall),
    )?;
    world.connect(hall, "north", door)?;
    world.connect(study, "south", door)?;

    let chest = world.create_entity(
        EntitySpec::new("chest")
            .with_adjective("wooden")
            .with_trait(Trait::container())
            .with_trait(Trait::openable(false)),
        Some(study),
    )?;
    world.create_entity(
        EntitySpec::new("letter").with_property("description", "It reads: \"Well done.\""),
        Some(chest),
    )?;

    let mut engine = CommandEngine::standard(world, player)?.with_config(config);

    // "search" is only understood where there is something to search.
    let grammar = engine.grammar_mut();
    grammar.define_vocabulary(
        "search_verbs",
        VocabularyDefinition::new(["search", "rummage"]).when(|ctx| {
            ctx.location
                .is_some_and(|room| ctx.world.contents(room).len() > 1)
        }),
    )?;
    grammar.add_rule(
        GrammarRule::define(":verb :target")
            .from_vocabulary("verb", "search_verbs")
            .maps_to(actions::EXAMINING)
            .with_key("story.search"),
    )?;

    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_world::WorldModel;

    #[test]
    fn walkthrough() {
        let mut engine = demo(EngineConfig::default()).unwrap();
        for command in [
            "take the brass key",
            "unlock door with key",
            "open door",
            "north",
            "open chest",
            "take letter",
        ] {
            let result = engine.execute_turn(command);
            assert!(result.success, "{command}: {:?}", result.event_types());
        }
        let letter = engine.world().find_by_name("letter").unwrap();
        assert_eq!(engine.world().location(letter), Some(engine.player()));
    }

    #[test]
    fn locked_door_blocks() {
        let mut engine = demo(EngineConfig::default()).unwrap();
        assert_eq!(engine.execute_turn("n").error_code(), Some("door_locked"));
        assert_eq!(engine.execute_turn("open door").error_code(), Some("locked"));
    }
}

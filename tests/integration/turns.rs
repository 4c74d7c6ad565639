//! Turn execution through the command engine.

use parley_actions::{ChainOptions, EventDraft, standard::events};
use parley_foundation::{EntityId, Value};
use parley_runtime::{CommandEngine, EngineConfig, TurnResult, codes};
use parley_world::{EntitySpec, Trait, World, WorldModel};
use proptest::prelude::*;

const FRUIT: &[&str] = &["apple", "banana", "cherry", "damson", "elderberry", "fig"];

fn orchard(count: usize) -> (CommandEngine, Vec<EntityId>) {
    let mut world = World::new();
    let room = world
        .create_entity(EntitySpec::new("orchard").with_trait(Trait::room()), None)
        .unwrap();
    let player = world
        .create_entity(
            EntitySpec::new("yourself").with_trait(Trait::Actor { is_player: true }),
            Some(room),
        )
        .unwrap();
    let basket = world
        .create_entity(
            EntitySpec::new("basket")
                .with_trait(Trait::container())
                .with_trait(Trait::openable(false)),
            Some(room),
        )
        .unwrap();
    let mut items = vec![basket];
    for name in &FRUIT[..count] {
        items.push(
            world
                .create_entity(EntitySpec::new(*name), Some(room))
                .unwrap(),
        );
    }
    (CommandEngine::standard(world, player).unwrap(), items)
}

fn codes_of(result: &TurnResult) -> Vec<&str> {
    result.events.iter().filter_map(|e| e.error_code()).collect()
}

#[test]
fn every_turn_has_an_event() {
    let (mut engine, _) = orchard(2);
    for input in ["", "xyzzy plugh", "take", "take unicorn", "open apple", "look", "i"] {
        let result = engine.execute_turn(input);
        assert!(!result.events.is_empty(), "{input:?} produced no events");
    }
}

#[test]
fn resolution_failures_carry_codes() {
    let (mut engine, _) = orchard(2);
    assert_eq!(engine.execute_turn("").error_code(), Some(codes::EMPTY_INPUT));
    assert_eq!(
        engine.execute_turn("juggle the apple").error_code(),
        Some(codes::UNKNOWN_COMMAND)
    );
    assert_eq!(
        engine.execute_turn("unlock basket with").error_code(),
        Some(codes::UNKNOWN_COMMAND)
    );

    let missing = engine.execute_turn("take unicorn");
    assert_eq!(missing.error_code(), Some(codes::NO_TARGET));
    let params = missing.events[0].params().unwrap();
    assert_eq!(params.get("text").and_then(Value::as_str), Some("unicorn"));
}

#[test]
fn ambiguity_lists_candidates() {
    let mut world = World::new();
    let room = world
        .create_entity(EntitySpec::new("hall").with_trait(Trait::room()), None)
        .unwrap();
    let player = world
        .create_entity(
            EntitySpec::new("yourself").with_trait(Trait::Actor { is_player: true }),
            Some(room),
        )
        .unwrap();
    world
        .create_entity(EntitySpec::new("key").with_adjective("iron"), Some(room))
        .unwrap();
    world
        .create_entity(EntitySpec::new("key").with_adjective("silver"), Some(room))
        .unwrap();
    let mut engine = CommandEngine::standard(world, player).unwrap();

    let result = engine.execute_turn("take key");
    assert_eq!(result.error_code(), Some(codes::AMBIGUOUS_TARGET));
    let candidates = result.events[0]
        .params()
        .and_then(|p| p.get("candidates"))
        .and_then(Value::as_str)
        .unwrap()
        .to_string();
    assert!(candidates.contains("iron key"));
    assert!(candidates.contains("silver key"));

    assert!(engine.execute_turn("take the silver key").success);
}

/// Puts an egg in the (closed) basket.
fn add_egg(engine: &mut CommandEngine, basket: EntityId) -> EntityId {
    let world = engine.world_mut();
    world.set_open(basket, true).unwrap();
    let egg = world.create_entity(EntitySpec::new("egg"), Some(basket)).unwrap();
    world.set_open(basket, false).unwrap();
    egg
}

#[test]
fn opening_reveals_through_the_engine() {
    let (mut engine, items) = orchard(0);
    let basket = items[0];
    let egg = add_egg(&mut engine, basket);

    let result = engine.execute_turn("open basket");
    assert!(result.success);
    assert_eq!(
        result.event_types(),
        vec!["opened", events::OPENED, events::REVEALED, "action.success"]
    );
    assert_eq!(result.fired.len(), 1);
    assert_eq!(result.fired[0].trigger, result.events[1].id);
    assert_eq!(result.fired[0].derived, result.events[2].id);

    assert!(engine.execute_turn("take egg").success);
    assert_eq!(engine.world().location(egg), Some(engine.player()));
}

#[test]
fn story_chains_run_after_standard_ones() {
    let (mut engine, _) = orchard(1);
    engine.chains_mut().chain_event(
        events::OPENED,
        |event, _| {
            let target = event.get("targetName").cloned().unwrap_or(Value::Nil);
            Some(EventDraft::new("story.creak").with("of", target))
        },
        ChainOptions::new("story.creak").with_priority(500),
    );

    let result = engine.execute_turn("open basket");
    let types = result.event_types();
    assert_eq!(types[1], events::OPENED);
    assert_eq!(types[2], "story.creak");
    assert_eq!(types.last(), Some(&"action.success"));
}

#[test]
fn chain_depth_comes_from_config() {
    let (engine, items) = orchard(0);
    let mut engine = engine.with_config(EngineConfig::new().with_max_chain_depth(0));
    add_egg(&mut engine, items[0]);

    let result = engine.execute_turn("open basket");
    assert!(result.success);
    assert!(result.fired.is_empty());
    assert_eq!(result.events.len(), 3);
}

#[test]
fn failed_validation_leaves_world_alone() {
    let (mut engine, items) = orchard(1);
    let basket = items[0];

    let result = engine.execute_turn("open apple");
    assert!(!result.success);
    assert_eq!(codes_of(&result), vec!["not_openable"]);

    let result = engine.execute_turn("close basket");
    assert_eq!(codes_of(&result), vec!["already_closed"]);
    assert!(!engine.world().is_open(basket));
}

#[test]
fn comma_lists_name_each_item() {
    let (mut engine, items) = orchard(4);
    let result = engine.execute_turn("take apple, banana, and cherry");
    assert!(result.success, "{:?}", result.event_types());

    let player = engine.player();
    let held: Vec<bool> = items[1..]
        .iter()
        .map(|id| engine.world().location(*id) == Some(player))
        .collect();
    assert_eq!(held, vec![true, true, true, false]);

    let result = engine.execute_turn("drop all but apple, banana");
    assert!(result.success, "{:?}", result.event_types());
    assert_eq!(engine.world().location(items[3]), engine.world().location(items[0]));
    assert_eq!(engine.world().location(items[1]), Some(player));
}

proptest! {
    #[test]
    fn take_all_but_takes_exactly_the_rest(count in 1usize..=6, mask in prop::collection::vec(any::<bool>(), 6)) {
        let (mut engine, items) = orchard(count);
        let fruit = &items[1..];
        let except: Vec<&str> = FRUIT[..count]
            .iter()
            .zip(&mask)
            .filter_map(|(name, skip)| skip.then_some(*name))
            .collect();
        prop_assume!(!except.is_empty() && except.len() < count);

        let input = format!("take all but the {}", except.join(" and the "));
        let result = engine.execute_turn(&input);
        prop_assert!(result.success, "{:?}", result.event_types());

        let player = engine.player();
        for (name, id) in FRUIT[..count].iter().zip(fruit) {
            let held = engine.world().location(*id) == Some(player);
            prop_assert_eq!(held, !except.contains(name), "{}", name);
        }
    }
}

//! Matching tests against the standard rules.

use parley_foundation::EntityId;
use parley_grammar::stdlib::actions;
use parley_grammar::{
    EnglishGrammarEngine, GrammarContext, GrammarEngine, GrammarRule, MatchOptions,
    PatternCompiler, PatternMatch, SlotMatch, VocabularyDefinition, register_standard_grammar,
};
use parley_world::{EntitySpec, Trait, World};

struct Setup {
    world: World,
    player: EntityId,
    coin: EntityId,
    jar: EntityId,
}

fn setup() -> Setup {
    let mut world = World::new();
    let room = world
        .create_entity(EntitySpec::new("kitchen").with_trait(Trait::room()), None)
        .unwrap();
    let player = world
        .create_entity(
            EntitySpec::new("yourself").with_trait(Trait::Actor { is_player: true }),
            Some(room),
        )
        .unwrap();
    let coin = world
        .create_entity(EntitySpec::new("coin").with_adjective("gold"), Some(player))
        .unwrap();
    let jar = world
        .create_entity(
            EntitySpec::new("jar")
                .with_trait(Trait::container())
                .with_trait(Trait::openable(true)),
            Some(room),
        )
        .unwrap();
    Setup {
        world,
        player,
        coin,
        jar,
    }
}

fn standard_engine() -> EnglishGrammarEngine {
    let mut engine = EnglishGrammarEngine::new();
    register_standard_grammar(&mut engine).unwrap();
    engine
}

fn best(engine: &EnglishGrammarEngine, s: &Setup, input: &str) -> Option<PatternMatch> {
    let context = GrammarContext::new(&s.world, s.player);
    engine.best_match(&engine.tokenize(input), &context, &MatchOptions::default())
}

#[test]
fn put_coin_into_jar() {
    let s = setup();
    let engine = standard_engine();

    let m = best(&engine, &s, "put coin into jar").unwrap();
    assert_eq!(m.action(), actions::PUTTING);
    assert_eq!(m.rule.key.as_deref(), Some("stdlib.putting.in"));
    assert_eq!(m.slot("item").and_then(SlotMatch::entity), Some(s.coin));
    assert_eq!(m.slot("container").and_then(SlotMatch::entity), Some(s.jar));
    assert_eq!(m.semantics.spatial_relation.as_deref(), Some("in"));
    assert!(m.confidence > 0.99);
}

#[test]
fn adjectives_narrow_the_phrase() {
    let s = setup();
    let engine = standard_engine();
    let m = best(&engine, &s, "drop the gold coin").unwrap();
    assert_eq!(m.action(), actions::DROPPING);
    assert_eq!(m.slot("items").and_then(SlotMatch::entity), Some(s.coin));
}

#[test]
fn bare_direction_and_go() {
    let s = setup();
    let engine = standard_engine();
    let bare = best(&engine, &s, "n").unwrap();
    let go = best(&engine, &s, "go north").unwrap();
    assert_eq!(bare.action(), actions::GOING);
    assert_eq!(go.action(), actions::GOING);
    assert_eq!(bare.semantics.direction.as_deref(), Some("north"));
}

#[test]
fn unknown_verb_finds_nothing() {
    let s = setup();
    let engine = standard_engine();
    assert!(best(&engine, &s, "dance with the jar").is_none());
}

#[test]
fn dangling_preposition_leaves_optional_group_unmatched() {
    let s = setup();
    let engine = standard_engine();
    assert!(best(&engine, &s, "unlock jar with").is_none());

    let full = best(&engine, &s, "unlock jar with coin").unwrap();
    assert_eq!(full.action(), actions::UNLOCKING);
    assert_eq!(full.slot("key").and_then(SlotMatch::entity), Some(s.coin));
}

#[test]
fn higher_priority_wins_on_equal_confidence() {
    let s = setup();
    let mut engine = EnglishGrammarEngine::new();
    engine
        .add_rule(GrammarRule::define("rub :thing").maps_to("story.polishing"))
        .unwrap();
    engine
        .add_rule(
            GrammarRule::define("rub :thing")
                .maps_to("story.wishing")
                .with_priority(150),
        )
        .unwrap();

    let m = best(&engine, &s, "rub jar").unwrap();
    assert_eq!(m.action(), "story.wishing");
}

#[test]
fn re_registering_a_key_replaces_the_rule() {
    let mut engine = standard_engine();
    let before = engine.rules().len();
    engine
        .add_rule(
            GrammarRule::define("snatch :items")
                .maps_to(actions::TAKING)
                .with_key("stdlib.taking"),
        )
        .unwrap();
    assert_eq!(engine.rules().len(), before);
    assert!(engine.rules().iter().all(|r| r.pattern != "take|get|grab :items"));
}

#[test]
fn invalid_patterns_are_rejected() {
    assert!(PatternCompiler::compile("").is_err());
    assert!(PatternCompiler::compile("take [the").is_err());
    let mut engine = EnglishGrammarEngine::new();
    assert!(engine.add_rule(GrammarRule::define("take :item")).is_err());
    assert!(
        engine
            .add_rule(GrammarRule::define("take :item").text("other").maps_to("x"))
            .is_err()
    );
}

#[test]
fn when_gated_vocabulary() {
    let s = setup();
    let mut engine = EnglishGrammarEngine::new();
    engine
        .add_rule(
            GrammarRule::define(":verb :target")
                .from_vocabulary("verb", "rituals")
                .maps_to("story.ritual"),
        )
        .unwrap();

    // Closed gate: the word is unknown.
    engine
        .define_vocabulary(
            "rituals",
            VocabularyDefinition::new(["bless"]).when(|ctx| ctx.location.is_none()),
        )
        .unwrap();
    assert!(best(&engine, &s, "bless jar").is_none());

    // Open gate: the same words match.
    assert!(engine.vocabulary_mut().remove("rituals"));
    engine
        .define_vocabulary(
            "rituals",
            VocabularyDefinition::new(["bless"]).when(|ctx| ctx.location.is_some()),
        )
        .unwrap();
    let m = best(&engine, &s, "bless jar").unwrap();
    assert_eq!(m.action(), "story.ritual");
    assert_eq!(m.slot("target").and_then(SlotMatch::entity), Some(s.jar));
}

#[test]
fn bare_put_pattern_consumes_every_token() {
    let s = setup();
    let mut engine = EnglishGrammarEngine::new();
    engine
        .add_rule(GrammarRule::define("put :item in|into :container").maps_to(actions::PUTTING))
        .unwrap();

    let context = GrammarContext::new(&s.world, s.player);
    let matches = engine.find_matches(
        &engine.tokenize("put coin into jar"),
        &context,
        &MatchOptions::default(),
    );
    assert_eq!(matches.len(), 1);
    let m = &matches[0];
    assert_eq!(m.slot("item").map(|slot| slot.text.as_str()), Some("coin"));
    assert_eq!(m.slot("container").map(|slot| slot.text.as_str()), Some("jar"));
    assert!((m.confidence - 1.0).abs() < f64::EPSILON);
    assert_eq!(m.consumed, 4);
}

//! Scope resolution tests.

use parley_foundation::EntityId;
use parley_grammar::{
    EnglishGrammarEngine, GrammarContext, GrammarEngine, GrammarRule, MatchOptions,
    ScopeConstraint, ScopeResolver, SlotMatch, SlotResolution,
};
use parley_world::{EntitySpec, Trait, World};

struct Cellar {
    world: World,
    player: EntityId,
    crate_: EntityId,
    bottle: EntityId,
    red_key: EntityId,
    blue_key: EntityId,
    ghost: EntityId,
}

fn cellar() -> Cellar {
    let mut world = World::new();
    let room = world
        .create_entity(EntitySpec::new("cellar").with_trait(Trait::room()), None)
        .unwrap();
    let elsewhere = world
        .create_entity(EntitySpec::new("attic").with_trait(Trait::room()), None)
        .unwrap();
    let player = world
        .create_entity(
            EntitySpec::new("yourself").with_trait(Trait::Actor { is_player: true }),
            Some(room),
        )
        .unwrap();
    let crate_ = world
        .create_entity(
            EntitySpec::new("crate")
                .with_trait(Trait::container())
                .with_trait(Trait::openable(false)),
            Some(room),
        )
        .unwrap();
    let bottle = world
        .create_entity(EntitySpec::new("bottle"), Some(crate_))
        .unwrap();
    let red_key = world
        .create_entity(EntitySpec::new("key").with_adjective("red"), Some(room))
        .unwrap();
    let blue_key = world
        .create_entity(EntitySpec::new("key").with_adjective("blue"), Some(room))
        .unwrap();
    let ghost = world
        .create_entity(
            EntitySpec::new("ghost").with_property("haunting", true),
            Some(elsewhere),
        )
        .unwrap();
    Cellar {
        world,
        player,
        crate_,
        bottle,
        red_key,
        blue_key,
        ghost,
    }
}

fn words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

#[test]
fn closed_container_hides_contents() {
    let mut c = cellar();
    let resolver = ScopeResolver::new();
    let visible = ScopeConstraint::default();

    {
        let ctx = GrammarContext::new(&c.world, c.player);
        assert!(!resolver.candidates(&visible, &ctx).contains(&c.bottle));
    }

    c.world.set_open(c.crate_, true).unwrap();
    let ctx = GrammarContext::new(&c.world, c.player);
    assert!(resolver.candidates(&visible, &ctx).contains(&c.bottle));
}

#[test]
fn same_name_is_ambiguous_until_qualified() {
    let c = cellar();
    let ctx = GrammarContext::new(&c.world, c.player);
    let resolver = ScopeResolver::new();
    let scope = ScopeConstraint::default();

    match resolver.resolve_slot(&words("key"), &scope, &ctx) {
        SlotResolution::Ambiguous { text, candidates } => {
            assert_eq!(text, "key");
            assert_eq!(candidates.len(), 2);
            assert!(candidates.contains(&c.red_key) && candidates.contains(&c.blue_key));
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert_eq!(
        resolver.resolve_slot(&words("blue key"), &scope, &ctx),
        SlotResolution::Unique(c.blue_key)
    );
}

#[test]
fn ambiguous_slot_surfaces_in_match() {
    let c = cellar();
    let mut engine = EnglishGrammarEngine::new();
    engine
        .add_rule(GrammarRule::define("take :items").maps_to("if.action.taking"))
        .unwrap();
    let ctx = GrammarContext::new(&c.world, c.player);
    let m = engine
        .best_match(&engine.tokenize("take key"), &ctx, &MatchOptions::default())
        .unwrap();
    let slot = m.slot("items").unwrap();
    assert!(slot.is_ambiguous());
    assert!(slot.entity().is_none());
}

#[test]
fn extensions_and_allowlist_widen_scope() {
    let c = cellar();
    let ghost = c.ghost;
    let mut resolver = ScopeResolver::new();
    resolver.register_extension("haunts", move |_| vec![ghost]);
    let ctx = GrammarContext::new(&c.world, c.player);

    let plain = ScopeConstraint::default();
    assert!(!resolver.candidates(&plain, &ctx).contains(&ghost));

    let extended = ScopeConstraint::builder().include_rule("haunts").build();
    assert!(resolver.candidates(&extended, &ctx).contains(&ghost));

    let listed = ScopeConstraint::builder().also_include([ghost]).build();
    assert!(resolver.candidates(&listed, &ctx).contains(&ghost));

    // Unknown extensions contribute nothing.
    let unknown = ScopeConstraint::builder().include_rule("nowhere").build();
    assert_eq!(
        resolver.candidates(&unknown, &ctx),
        resolver.candidates(&plain, &ctx)
    );
}

#[test]
fn property_filter_tests_traits_for_booleans() {
    let c = cellar();
    let ctx = GrammarContext::new(&c.world, c.player);
    let resolver = ScopeResolver::new();

    let containers = ScopeConstraint::builder().matching("container", true).build();
    assert_eq!(resolver.candidates(&containers, &ctx), vec![c.crate_]);

    let haunting = ScopeConstraint::builder()
        .all()
        .matching("haunting", true)
        .build();
    assert_eq!(resolver.candidates(&haunting, &ctx), vec![c.ghost]);
}

#[test]
fn predicate_filters_see_bound_slots() {
    let c = cellar();
    let mut engine = EnglishGrammarEngine::new();
    engine
        .add_rule(
            GrammarRule::define("compare :first with :second")
                .where_scope("second", |s| {
                    s.where_fn(|entity, ctx| ctx.slot_entity("first") != Some(entity.id));
                })
                .maps_to("story.comparing"),
        )
        .unwrap();
    let ctx = GrammarContext::new(&c.world, c.player);
    let m = engine
        .best_match(
            &engine.tokenize("compare red key with key"),
            &ctx,
            &MatchOptions::default(),
        )
        .unwrap();
    assert_eq!(m.slot("first").and_then(SlotMatch::entity), Some(c.red_key));
    assert_eq!(m.slot("second").and_then(SlotMatch::entity), Some(c.blue_key));
}

//! Property tests for ranking, builders and multi-object phrases.

use std::collections::BTreeSet;

use parley_foundation::EntityId;
use parley_grammar::{
    EnglishGrammarEngine, GrammarContext, GrammarEngine, MatchOptions, ScopeBase,
    ScopeConstraint, ScopeResolver, SlotResolution, register_standard_grammar,
};
use parley_world::{EntitySpec, Trait, World};
use proptest::prelude::*;

const NOUNS: &[&str] = &[
    "apple", "bread", "candle", "dagger", "emerald", "feather", "goblet", "hammer",
];

const INPUTS: &[&str] = &[
    "take apple",
    "take all",
    "get the bread",
    "drop candle",
    "put dagger in goblet",
    "look",
    "x hammer",
    "n",
    "go up",
    "open goblet",
    "take all but the emerald",
];

fn room_with(count: usize) -> (World, EntityId, Vec<EntityId>) {
    let mut world = World::new();
    let room = world
        .create_entity(EntitySpec::new("vault").with_trait(Trait::room()), None)
        .unwrap();
    let player = world
        .create_entity(
            EntitySpec::new("yourself").with_trait(Trait::Actor { is_player: true }),
            Some(room),
        )
        .unwrap();
    let items = NOUNS[..count]
        .iter()
        .map(|noun| {
            let spec = if *noun == "goblet" {
                EntitySpec::new(*noun).with_trait(Trait::container())
            } else {
                EntitySpec::new(*noun)
            };
            world.create_entity(spec, Some(room)).unwrap()
        })
        .collect();
    (world, player, items)
}

proptest! {
    #[test]
    fn best_match_is_deterministic(input in prop::sample::select(INPUTS), count in 1usize..=8) {
        let (world, player, _) = room_with(count);
        let mut engine = EnglishGrammarEngine::new();
        register_standard_grammar(&mut engine).unwrap();
        let ctx = GrammarContext::new(&world, player);
        let tokens = engine.tokenize(input);

        let first = engine.best_match(&tokens, &ctx, &MatchOptions::default());
        let second = engine.best_match(&tokens, &ctx, &MatchOptions::default());
        prop_assert_eq!(first.is_some(), second.is_some());
        if let (Some(a), Some(b)) = (first, second) {
            prop_assert_eq!(a.rule.id(), b.rule.id());
            prop_assert_eq!(a.slots, b.slots);
            prop_assert!((a.confidence - b.confidence).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn all_but_partitions_the_pool(count in 2usize..=8, mask in prop::collection::vec(any::<bool>(), 8)) {
        let (world, player, items) = room_with(count);
        let ctx = GrammarContext::new(&world, player);
        let resolver = ScopeResolver::new();

        let except: Vec<&str> = NOUNS[..count]
            .iter()
            .zip(&mask)
            .filter_map(|(noun, keep)| keep.then_some(*noun))
            .collect();
        prop_assume!(!except.is_empty());
        let text = format!("all but {}", except.join(" and "));
        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();

        match resolver.resolve_slot(&words, &ScopeConstraint::default(), &ctx) {
            SlotResolution::Multiple { entities, excluded, is_all } => {
                prop_assert!(is_all);
                let kept: BTreeSet<EntityId> = entities.iter().copied().collect();
                let dropped: BTreeSet<EntityId> = excluded.iter().copied().collect();
                prop_assert!(kept.is_disjoint(&dropped));
                let union: BTreeSet<EntityId> = kept.union(&dropped).copied().collect();
                let pool: BTreeSet<EntityId> = items.iter().copied().collect();
                prop_assert_eq!(union, pool);
                prop_assert_eq!(dropped.len(), except.len());
            }
            SlotResolution::NotFound { .. } => {
                // Excluding everything leaves nothing to act on.
                prop_assert_eq!(except.len(), count);
            }
            other => prop_assert!(false, "unexpected resolution {:?}", other),
        }
    }

    #[test]
    fn built_constraints_are_snapshots(extra in prop::collection::vec(0u64..50, 0..6)) {
        let mut builder = ScopeConstraint::builder();
        builder.touchable().matching("lit", true);
        let first = builder.build();

        builder.carried().include_rule("later");
        for id in &extra {
            builder.also_include([EntityId::new(*id, 0)]);
        }
        let second = builder.build();

        prop_assert_eq!(first.base, ScopeBase::Touchable);
        prop_assert_eq!(first.filters.len(), 1);
        prop_assert!(first.explicit.is_empty());
        prop_assert!(first.extensions.is_empty());
        prop_assert_eq!(second.base, ScopeBase::Carried);
        prop_assert_eq!(second.explicit.len(), extra.len());
        prop_assert_eq!(second.extensions, vec!["later".to_string()]);
    }
}

//! Event chain registry behaviour.

use parley_actions::{ChainMode, ChainOptions, ChainRegistry, EventDraft, EventFactory};
use parley_foundation::Value;
use parley_world::World;
use proptest::prelude::*;

fn derive_to(
    event_type: String,
) -> impl Fn(&parley_actions::SemanticEvent, &dyn parley_world::WorldModel) -> Option<EventDraft> {
    move |_, _| Some(EventDraft::new(event_type.clone()))
}

#[test]
fn handler_returning_none_derives_nothing() {
    let mut registry = ChainRegistry::new();
    registry.chain_event("bell.rung", |_, _| None, ChainOptions::new("quiet"));

    let world = World::new();
    let factory = EventFactory::default();
    let trigger = factory.create(EventDraft::new("bell.rung"));
    let result = registry.process(vec![trigger], &world, &factory);
    assert_eq!(result.events.len(), 1);
    assert!(result.fired.is_empty());
}

#[test]
fn firings_record_lineage() {
    let mut registry = ChainRegistry::new();
    registry.chain_event("a", derive_to("b".into()), ChainOptions::new("a-b"));
    registry.chain_event("b", derive_to("c".into()), ChainOptions::new("b-c"));

    let world = World::new();
    let factory = EventFactory::default();
    let trigger = factory.create(EventDraft::new("a").with("n", 1_i64));
    let result = registry.process(vec![trigger], &world, &factory);

    assert_eq!(result.fired.len(), 2);
    assert_eq!(result.fired[0].key, "a-b");
    assert_eq!(result.fired[0].depth, 1);
    assert_eq!(result.fired[1].trigger, result.fired[0].derived);
    assert_eq!(result.fired[1].depth, 2);
    assert_eq!(result.events[2].get("_chainDepth"), Some(&Value::Int(2)));
}

proptest! {
    #[test]
    fn registering_a_key_twice_keeps_one_chain(
        keys in prop::collection::vec(prop::sample::select(vec!["k1", "k2", "k3"]), 1..12),
    ) {
        let mut registry = ChainRegistry::new();
        let mut last_for_key = std::collections::BTreeMap::new();
        for (i, key) in keys.iter().enumerate() {
            let derived = format!("derived.{i}");
            registry.chain_event("trigger", derive_to(derived.clone()), ChainOptions::new(*key));
            last_for_key.insert(*key, derived);
        }

        prop_assert_eq!(registry.len(), last_for_key.len());

        // Replacements keep the slot of the key's first registration.
        let mut first_seen: Vec<&str> = Vec::new();
        for key in &keys {
            if !first_seen.contains(key) {
                first_seen.push(key);
            }
        }
        prop_assert_eq!(registry.keys("trigger"), first_seen);

        let world = World::new();
        let factory = EventFactory::default();
        let trigger = factory.create(EventDraft::new("trigger"));
        let result = registry.process(vec![trigger], &world, &factory);

        let derived: std::collections::BTreeSet<String> =
            result.events[1..].iter().map(|e| e.event_type.clone()).collect();
        let expected: std::collections::BTreeSet<String> = last_for_key.into_values().collect();
        prop_assert_eq!(derived, expected);
    }

    #[test]
    fn override_leaves_only_the_new_chain(before in 0usize..6) {
        let mut registry = ChainRegistry::new();
        for i in 0..before {
            registry.chain_event("t", derive_to(format!("old.{i}")), ChainOptions::new(format!("k{i}")));
        }
        registry.chain_event(
            "t",
            derive_to("new".into()),
            ChainOptions::new("only").with_mode(ChainMode::Override),
        );
        prop_assert_eq!(registry.keys("t"), vec!["only"]);
    }
}

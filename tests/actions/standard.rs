//! Standard actions driven from parsed commands.

use parley_actions::standard::events::{OPENED, PUT_IN, REVEALED};
use parley_actions::{
    ActionContext, ActionOutcome, ActionRegistry, ActionRunner, ChainRegistry, EventFactory,
    ResolvedCommand, SemanticEvent, register_standard_actions, register_standard_chains,
};
use parley_foundation::{EntityId, Value};
use parley_grammar::{
    EnglishGrammarEngine, GrammarContext, GrammarEngine, MatchOptions, register_standard_grammar,
};
use parley_world::{EntitySpec, Trait, World, WorldModel};

/// Grammar, actions and chains over one world, without the turn engine.
struct Pipeline {
    world: World,
    player: EntityId,
    room: EntityId,
    grammar: EnglishGrammarEngine,
    actions: ActionRegistry,
    chains: ChainRegistry,
}

impl Pipeline {
    fn new() -> Self {
        let mut world = World::new();
        let room = world
            .create_entity(EntitySpec::new("pantry").with_trait(Trait::room()), None)
            .unwrap();
        let player = world
            .create_entity(
                EntitySpec::new("yourself").with_trait(Trait::Actor { is_player: true }),
                Some(room),
            )
            .unwrap();
        let mut grammar = EnglishGrammarEngine::new();
        register_standard_grammar(&mut grammar).unwrap();
        let mut actions = ActionRegistry::new();
        register_standard_actions(&mut actions);
        let mut chains = ChainRegistry::new();
        register_standard_chains(&mut chains);
        Self {
            world,
            player,
            room,
            grammar,
            actions,
            chains,
        }
    }

    fn add(&mut self, spec: EntitySpec, location: EntityId) -> EntityId {
        self.world.create_entity(spec, Some(location)).unwrap()
    }

    /// Parses and runs one command, returning every outcome and the
    /// chained event list.
    fn run(&mut self, input: &str) -> (Vec<ActionOutcome>, Vec<SemanticEvent>) {
        let matched = {
            let ctx = GrammarContext::new(&self.world, self.player);
            self.grammar
                .best_match(&self.grammar.tokenize(input), &ctx, &MatchOptions::default())
                .unwrap_or_else(|| panic!("no match for {input:?}"))
        };
        let action = self.actions.get(matched.action()).unwrap();
        let factory = EventFactory::new(1, 1);

        let mut outcomes = Vec::new();
        for command in ResolvedCommand::expand(&matched, self.player, input) {
            let mut ctx = ActionContext::new(&mut self.world, &command, &factory);
            outcomes.push(ActionRunner::run(action, &mut ctx));
        }
        let primary = outcomes.iter().flat_map(|o| o.events.clone()).collect();
        let chained = self.chains.process(primary, &self.world, &factory);
        (outcomes, chained.events)
    }
}

fn types(events: &[SemanticEvent]) -> Vec<&str> {
    events.iter().map(|e| e.event_type.as_str()).collect()
}

#[test]
fn put_coin_into_jar() {
    let mut p = Pipeline::new();
    let coin = p.add(EntitySpec::new("coin"), p.player);
    let jar = p.add(
        EntitySpec::new("jar")
            .with_trait(Trait::container())
            .with_trait(Trait::openable(true)),
        p.room,
    );

    let (outcomes, events) = p.run("put coin into jar");
    assert!(outcomes[0].succeeded());
    assert_eq!(p.world.location(coin), Some(jar));
    assert_eq!(types(&events), vec!["put_in", PUT_IN, "action.success"]);
    let success = events.last().unwrap();
    assert_eq!(success.message_id(), Some("put_in"));
    let params = success.params().unwrap();
    assert_eq!(params.get("item").and_then(Value::as_str), Some("coin"));
    assert_eq!(params.get("container").and_then(Value::as_str), Some("jar"));
}

#[test]
fn opening_a_closed_box_emits_three_events() {
    let mut p = Pipeline::new();
    let box_ = p.add(
        EntitySpec::new("box")
            .with_trait(Trait::container())
            .with_trait(Trait::openable(false)),
        p.room,
    );

    let (_, events) = p.run("open box");
    assert_eq!(types(&events), vec!["opened", OPENED, "action.success"]);
    assert_eq!(events[2].message_id(), Some("its_empty"));
    assert!(p.world.is_open(box_));
}

#[test]
fn opening_an_open_box_is_already_open() {
    let mut p = Pipeline::new();
    p.add(
        EntitySpec::new("box")
            .with_trait(Trait::container())
            .with_trait(Trait::openable(true)),
        p.room,
    );

    let (outcomes, events) = p.run("open box");
    assert!(!outcomes[0].executed);
    assert_eq!(types(&events), vec!["action.error"]);
    assert_eq!(events[0].error_code(), Some("already_open"));
}

#[test]
fn opening_a_full_box_reveals_after_the_rich_event() {
    let mut p = Pipeline::new();
    let box_ = p.add(
        EntitySpec::new("box")
            .with_trait(Trait::container())
            .with_trait(Trait::openable(false)),
        p.room,
    );
    p.add(EntitySpec::new("ring"), box_);
    p.add(EntitySpec::new("ribbon"), box_);

    let (_, events) = p.run("open the box");
    assert_eq!(
        types(&events),
        vec!["opened", OPENED, REVEALED, "action.success"]
    );
    let revealed = &events[2];
    assert_eq!(
        revealed.get("containerName").and_then(Value::as_str),
        Some("box")
    );
    assert_eq!(revealed.get("_chainedFrom").and_then(Value::as_str), Some(OPENED));
    assert_eq!(revealed.get("_chainSourceId"), Some(&Value::from(events[1].id)));
    assert_eq!(events[3].message_id(), Some("opened"));
}

#[test]
fn take_all_expands_per_item() {
    let mut p = Pipeline::new();
    let apple = p.add(EntitySpec::new("apple"), p.room);
    let pear = p.add(EntitySpec::new("pear"), p.room);
    let plum = p.add(EntitySpec::new("plum"), p.room);

    let (outcomes, _) = p.run("take all but the plum");
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(ActionOutcome::succeeded));
    assert_eq!(p.world.location(apple), Some(p.player));
    assert_eq!(p.world.location(pear), Some(p.player));
    assert_eq!(p.world.location(plum), Some(p.room));
}

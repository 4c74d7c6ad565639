//! The command engine: one story's grammar, actions, chains and world.

use parley_actions::{
    ACTION_ERROR, ActionContext, ActionOutcome, ActionRegistry, ActionRunner, ChainFiring,
    ChainRegistry, EventDraft, EventFactory, ResolvedCommand, SemanticEvent,
    register_standard_actions, register_standard_chains,
};
use parley_foundation::{EntityId, Result, Value};
use parley_grammar::{
    EnglishGrammarEngine, GrammarContext, GrammarEngine, PatternMatch, PronounState, SlotMatch,
    register_standard_grammar,
};
use parley_grammar::noun_phrase::describe;
use parley_world::{World, WorldModel};
use tracing::debug;

use crate::config::EngineConfig;
use crate::trace::{TraceEvent, Tracer};

/// Resolution failure codes.
pub mod codes {
    /// The input had no words.
    pub const EMPTY_INPUT: &str = "empty_input";
    /// No grammar rule matched.
    pub const UNKNOWN_COMMAND: &str = "unknown_command";
    /// An entity slot matched nothing in scope.
    pub const NO_TARGET: &str = "no_target";
    /// An entity slot matched several things equally well.
    pub const AMBIGUOUS_TARGET: &str = "ambiguous_target";
    /// The matched rule names an action that is not registered.
    pub const UNKNOWN_ACTION: &str = "unknown_action";
}

// =============================================================================
// Turn Result
// =============================================================================

/// Everything one turn produced.
#[derive(Clone, Debug)]
pub struct TurnResult {
    /// Turn number, starting at 1.
    pub turn: u64,
    /// Raw input.
    pub input: String,
    /// No `action.error` was emitted.
    pub success: bool,
    /// The action that ran, if matching got that far.
    pub action: Option<String>,
    /// Primary and derived events, in order. Never empty.
    pub events: Vec<SemanticEvent>,
    /// Chain derivations performed.
    pub fired: Vec<ChainFiring>,
}

impl TurnResult {
    fn new(turn: u64, input: &str, action: Option<String>, events: Vec<SemanticEvent>) -> Self {
        let success = !events.iter().any(SemanticEvent::is_error);
        Self {
            turn,
            input: input.to_string(),
            success,
            action,
            events,
            fired: Vec::new(),
        }
    }

    /// Event types in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.event_type.as_str()).collect()
    }

    /// Error code of the first `action.error` event.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.events.iter().find_map(SemanticEvent::error_code)
    }

    /// First event of a type.
    #[must_use]
    pub fn event(&self, event_type: &str) -> Option<&SemanticEvent> {
        self.events.iter().find(|e| e.is(event_type))
    }
}

// =============================================================================
// Command Engine
// =============================================================================

/// Owns everything one story needs to turn text into events.
///
/// ```text
/// input ─► tokenize ─► find_matches ─► best match ─► slot checks
///                                                       │
///     TurnResult ◄─ chains ◄─ ActionRunner (per object) ◄┘
/// ```
#[derive(Debug)]
pub struct CommandEngine {
    world: World,
    player: EntityId,
    grammar: EnglishGrammarEngine,
    actions: ActionRegistry,
    chains: ChainRegistry,
    pronouns: PronounState,
    config: EngineConfig,
    tracer: Tracer,
    turn: u64,
    next_event_id: u64,
}

impl CommandEngine {
    /// An engine with no rules, actions or chains.
    #[must_use]
    pub fn new(world: World, player: EntityId) -> Self {
        let config = EngineConfig::default();
        Self {
            world,
            player,
            grammar: EnglishGrammarEngine::new(),
            actions: ActionRegistry::new(),
            chains: ChainRegistry::new().with_max_depth(config.max_chain_depth),
            pronouns: PronounState::new(),
            tracer: Tracer::new(config.tracer.clone()),
            config,
            turn: 0,
            next_event_id: 1,
        }
    }

    /// An engine with the standard grammar, actions and chains.
    ///
    /// # Errors
    ///
    /// Returns an error if a standard rule fails to build.
    pub fn standard(world: World, player: EntityId) -> Result<Self> {
        let mut engine = Self::new(world, player);
        register_standard_grammar(&mut engine.grammar)?;
        register_standard_actions(&mut engine.actions);
        register_standard_chains(&mut engine.chains);
        Ok(engine)
    }

    /// Applies a configuration, replacing the tracer.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.chains = std::mem::take(&mut self.chains).with_max_depth(config.max_chain_depth);
        self.tracer = Tracer::new(config.tracer.clone());
        self.config = config;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably (for story setup between turns).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player entity.
    #[must_use]
    pub fn player(&self) -> EntityId {
        self.player
    }

    /// The grammar engine.
    #[must_use]
    pub fn grammar(&self) -> &EnglishGrammarEngine {
        &self.grammar
    }

    /// The grammar engine, mutably (to add rules and vocabulary).
    pub fn grammar_mut(&mut self) -> &mut EnglishGrammarEngine {
        &mut self.grammar
    }

    /// The action registry.
    #[must_use]
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// The action registry, mutably.
    pub fn actions_mut(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    /// The chain registry.
    #[must_use]
    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    /// The chain registry, mutably.
    pub fn chains_mut(&mut self) -> &mut ChainRegistry {
        &mut self.chains
    }

    /// Pronoun referents carried between turns.
    #[must_use]
    pub fn pronouns(&self) -> &PronounState {
        &self.pronouns
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The tracer.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// The tracer, mutably (to toggle it).
    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    /// Turns executed so far.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.turn
    }

    // -------------------------------------------------------------------------
    // Turns
    // -------------------------------------------------------------------------

    /// Runs one command to completion.
    ///
    /// Every turn yields at least one event. Failures before an action runs
    /// become a single `action.error` with one of the [`codes`].
    pub fn execute_turn(&mut self, input: &str) -> TurnResult {
        self.turn += 1;
        let turn = self.turn;
        self.tracer.turn_start(turn, input);
        let factory = EventFactory::new(turn, self.next_event_id);

        let mut result = match self.resolve(input, &factory) {
            Ok(matched) => self.run(&matched, input, &factory),
            Err(event) => TurnResult::new(turn, input, None, vec![event]),
        };
        result.turn = turn;
        self.next_event_id = factory.next_id();

        for event in &result.events {
            self.tracer.record(TraceEvent::EventEmitted {
                id: event.id.0,
                event_type: event.event_type.clone(),
            });
        }
        debug!(
            turn,
            input,
            success = result.success,
            events = result.events.len(),
            "turn complete"
        );
        self.tracer.turn_end(turn, result.success);
        result
    }

    /// Tokenizes, matches and checks the best match's slots.
    fn resolve(
        &mut self,
        input: &str,
        factory: &EventFactory,
    ) -> std::result::Result<PatternMatch, SemanticEvent> {
        let tokens = self.grammar.tokenize(input);
        if tokens.is_empty() {
            return Err(self.resolution_error(factory, codes::EMPTY_INPUT, Value::map()));
        }
        self.tracer.record(TraceEvent::Tokenized {
            words: tokens.iter().map(|t| t.normalized.clone()).collect(),
        });

        let matches = {
            let context =
                GrammarContext::new(&self.world, self.player).with_pronouns(&self.pronouns);
            self.grammar
                .find_matches(&tokens, &context, &self.config.match_options)
        };
        let candidates = matches.len();
        let Some(best) = matches.into_iter().next() else {
            return Err(self.resolution_error(
                factory,
                codes::UNKNOWN_COMMAND,
                Value::map().with("input", input.trim()),
            ));
        };

        self.tracer.record(TraceEvent::RuleMatched {
            rule: best.rule.id(),
            action: best.action().to_string(),
            confidence: best.confidence,
            candidates,
        });
        for (name, slot) in &best.slots {
            if slot.slot_type.is_entity() {
                self.tracer.record(TraceEvent::ScopeResolved {
                    slot: name.clone(),
                    text: slot.text.clone(),
                    entities: slot.entities.clone(),
                });
            }
        }

        if let Some(slot) = first_slot(&best, SlotMatch::is_ambiguous) {
            let names: Vec<String> = slot
                .candidates
                .iter()
                .filter_map(|id| self.world.entity(*id))
                .map(describe)
                .collect();
            return Err(self.resolution_error(
                factory,
                codes::AMBIGUOUS_TARGET,
                Value::map()
                    .with("text", slot.text.as_str())
                    .with("candidates", names.join(", ")),
            ));
        }
        if let Some(slot) = first_slot(&best, SlotMatch::is_unresolved) {
            return Err(self.resolution_error(
                factory,
                codes::NO_TARGET,
                Value::map().with("text", slot.text.as_str()),
            ));
        }
        Ok(best)
    }

    /// Runs the matched action once per object and processes chains.
    fn run(&mut self, matched: &PatternMatch, input: &str, factory: &EventFactory) -> TurnResult {
        let action_id = matched.action().to_string();
        let Some(action) = self.actions.get(&action_id) else {
            let event = self.resolution_error(
                factory,
                codes::UNKNOWN_ACTION,
                Value::map().with("action", action_id.as_str()),
            );
            return TurnResult::new(self.turn, input, Some(action_id), vec![event]);
        };

        let commands = ResolvedCommand::expand(matched, self.player, input);
        let is_all = commands.iter().any(ResolvedCommand::is_all);
        let mut outcomes: Vec<(ResolvedCommand, ActionOutcome)> = Vec::with_capacity(commands.len());
        for command in commands {
            let outcome = {
                let mut ctx = ActionContext::new(&mut self.world, &command, factory);
                ActionRunner::run(action, &mut ctx)
            };
            self.tracer.validated(&action_id, outcome.validation.error());
            if outcome.executed {
                self.tracer.executed(&action_id, outcome.error.as_deref());
            }
            outcomes.push((command, outcome));
        }

        // "take all" reports only what worked, unless nothing did.
        if is_all && outcomes.iter().any(|(_, o)| o.succeeded()) {
            outcomes.retain(|(_, o)| o.succeeded());
        }

        let objects: Vec<EntityId> = outcomes
            .iter()
            .filter(|(_, o)| o.succeeded())
            .filter_map(|(c, _)| c.direct_object)
            .collect();
        let primary: Vec<SemanticEvent> = outcomes
            .into_iter()
            .flat_map(|(_, o)| o.events)
            .collect();

        let chained = self.chains.process(primary, &self.world, factory);
        for firing in &chained.fired {
            self.tracer.record(TraceEvent::ChainFired {
                key: firing.key.clone(),
                trigger: firing.trigger.0,
                derived: firing.derived.0,
                depth: firing.depth,
            });
        }

        self.pronouns.note_objects(&objects);
        let world = &self.world;
        self.pronouns.retain(|id| world.entity(id).is_some());

        let mut result = TurnResult::new(self.turn, input, Some(action_id), chained.events);
        result.fired = chained.fired;
        result
    }

    fn resolution_error(&self, factory: &EventFactory, code: &str, params: Value) -> SemanticEvent {
        let mut draft = EventDraft::new(ACTION_ERROR)
            .with_actor(self.player)
            .with("error", code)
            .with("messageId", code)
            .with("params", params);
        if let Some(room) = self.world.containing_room(self.player) {
            draft = draft.with_location(room);
        }
        factory.create(draft)
    }
}

/// First entity slot, in pattern order, that passes `test`.
fn first_slot<'m>(matched: &'m PatternMatch, test: impl Fn(&SlotMatch) -> bool) -> Option<&'m SlotMatch> {
    let mut slots: Vec<(&String, &SlotMatch)> = matched.slots.iter().collect();
    slots.sort_by_key(|(name, _)| matched.rule.compiled.slots.get(*name).copied());
    slots
        .into_iter()
        .map(|(_, slot)| slot)
        .find(|slot| slot.slot_type.is_entity() && test(slot))
}

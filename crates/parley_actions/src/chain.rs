//! Event chains: declarative derivation of secondary events.
//!
//! A chain watches one event type. When an event of that type is emitted, the
//! chain's handler may return a draft; the derived event is inserted right
//! after its trigger. Derived events can trigger other chains, but a chain
//! never fires again inside its own derivation lineage.
//!
//! ```text
//! opened ─► if.event.opened ─► [opened-revealed] ─► if.event.revealed
//!                                                        │
//!                                                        ▼
//!                                             chains on if.event.revealed
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use parley_world::WorldModel;
use tracing::{debug, trace, warn};

use crate::event::{EventDraft, EventFactory, EventId, SemanticEvent};

/// Default chain priority. Lower runs first.
pub const DEFAULT_CHAIN_PRIORITY: i32 = 100;

/// Default maximum derivation depth.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 10;

/// A chain handler: reads the trigger and the world, maybe derives an event.
pub type ChainHandler = Arc<dyn Fn(&SemanticEvent, &dyn WorldModel) -> Option<EventDraft>>;

/// How a registration interacts with existing chains on the same trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChainMode {
    /// Add alongside existing chains (a same-key chain is still replaced).
    #[default]
    Cascade,
    /// Remove every existing chain for the trigger first.
    Override,
}

/// Registration options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainOptions {
    /// Identity within the trigger.
    pub key: String,
    /// Lower runs first.
    pub priority: i32,
    /// Cascade or override.
    pub mode: ChainMode,
}

impl ChainOptions {
    /// Options with the given key and defaults otherwise.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            priority: DEFAULT_CHAIN_PRIORITY,
            mode: ChainMode::Cascade,
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ChainMode) -> Self {
        self.mode = mode;
        self
    }
}

#[derive(Clone)]
struct Chain {
    key: String,
    priority: i32,
    sequence: u64,
    handler: ChainHandler,
}

/// One derivation performed during [`ChainRegistry::process`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainFiring {
    /// Chain key.
    pub key: String,
    /// Trigger event.
    pub trigger: EventId,
    /// Derived event.
    pub derived: EventId,
    /// Depth of the derived event (1 for a direct derivation).
    pub depth: usize,
}

/// Result of processing a turn's primary events.
#[derive(Clone, Debug, Default)]
pub struct ChainResult {
    /// Primary and derived events, in order.
    pub events: Vec<SemanticEvent>,
    /// Every derivation performed.
    pub fired: Vec<ChainFiring>,
}

/// Chains by trigger event type.
#[derive(Clone)]
pub struct ChainRegistry {
    chains: BTreeMap<String, Vec<Chain>>,
    next_sequence: u64,
    max_depth: usize,
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chains: BTreeMap::new(),
            next_sequence: 0,
            max_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    /// Sets the maximum derivation depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Maximum derivation depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Registers a chain on `trigger`.
    ///
    /// A chain with the same key on the same trigger is replaced in place,
    /// keeping its position among equal priorities. In
    /// [`ChainMode::Override`] every chain on the trigger is removed first.
    pub fn chain_event<F>(&mut self, trigger: &str, handler: F, options: ChainOptions)
    where
        F: Fn(&SemanticEvent, &dyn WorldModel) -> Option<EventDraft> + 'static,
    {
        let chains = self.chains.entry(trigger.to_string()).or_default();
        let replaced = chains
            .iter()
            .position(|c| c.key == options.key)
            .map(|index| chains.remove(index).sequence);
        let sequence = replaced.unwrap_or_else(|| {
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            sequence
        });
        if options.mode == ChainMode::Override {
            chains.clear();
        }
        debug!(trigger, key = %options.key, priority = options.priority, "chain registered");
        chains.push(Chain {
            key: options.key,
            priority: options.priority,
            sequence,
            handler: Arc::new(handler),
        });
        chains.sort_by_key(|c| (c.priority, c.sequence));
    }

    /// Removes a chain. Returns true if it existed.
    pub fn remove(&mut self, trigger: &str, key: &str) -> bool {
        let Some(chains) = self.chains.get_mut(trigger) else {
            return false;
        };
        let before = chains.len();
        chains.retain(|c| c.key != key);
        before != chains.len()
    }

    /// Keys registered for a trigger, in execution order.
    #[must_use]
    pub fn keys(&self, trigger: &str) -> Vec<&str> {
        self.chains
            .get(trigger)
            .map(|chains| chains.iter().map(|c| c.key.as_str()).collect())
            .unwrap_or_default()
    }

    /// Returns true if a chain with this key is registered on `trigger`.
    #[must_use]
    pub fn has_chain(&self, trigger: &str, key: &str) -> bool {
        self.chains
            .get(trigger)
            .is_some_and(|chains| chains.iter().any(|c| c.key == key))
    }

    /// Total number of chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.values().map(Vec::len).sum()
    }

    /// Returns true if no chains are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs chains over `events`, inserting derived events after their
    /// triggers.
    pub fn process(
        &self,
        events: Vec<SemanticEvent>,
        world: &dyn WorldModel,
        factory: &EventFactory,
    ) -> ChainResult {
        let mut result = ChainResult::default();
        for event in events {
            result.events.push(event.clone());
            self.derive(&event, &[], 0, world, factory, &mut result);
        }
        result
    }

    fn derive(
        &self,
        trigger: &SemanticEvent,
        lineage: &[&str],
        depth: usize,
        world: &dyn WorldModel,
        factory: &EventFactory,
        result: &mut ChainResult,
    ) {
        let Some(chains) = self.chains.get(&trigger.event_type) else {
            return;
        };
        if depth >= self.max_depth {
            warn!(
                event_type = %trigger.event_type,
                depth,
                "chain depth limit reached, derivation stopped"
            );
            return;
        }

        for chain in chains {
            if lineage.contains(&chain.key.as_str()) {
                trace!(key = %chain.key, "chain skipped inside its own lineage");
                continue;
            }
            let Some(draft) = (chain.handler)(trigger, world) else {
                continue;
            };

            let derived_depth = depth + 1;
            let data = draft
                .data
                .with("_chainedFrom", trigger.event_type.as_str())
                .with("_chainSourceId", trigger.id)
                .with("_chainDepth", i64::try_from(derived_depth).unwrap_or(i64::MAX));
            let derived = factory.create(draft.with_data(data));
            debug!(
                key = %chain.key,
                trigger = %trigger.event_type,
                derived = %derived.event_type,
                "chain fired"
            );

            result.fired.push(ChainFiring {
                key: chain.key.clone(),
                trigger: trigger.id,
                derived: derived.id,
                depth: derived_depth,
            });
            result.events.push(derived.clone());

            let mut inner: Vec<&str> = lineage.to_vec();
            inner.push(&chain.key);
            self.derive(&derived, &inner, derived_depth, world, factory, result);
        }
    }
}

impl std::fmt::Debug for ChainRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: BTreeMap<&str, Vec<&str>> = self
            .chains
            .iter()
            .map(|(trigger, chains)| {
                (
                    trigger.as_str(),
                    chains.iter().map(|c| c.key.as_str()).collect(),
                )
            })
            .collect();
        f.debug_struct("ChainRegistry")
            .field("chains", &keys)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

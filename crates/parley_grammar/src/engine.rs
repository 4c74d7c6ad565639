//! Rule storage, match results and the engine trait.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parley_foundation::{EntityId, Result};
use tracing::debug;

use crate::context::GrammarContext;
use crate::pattern::SlotType;
use crate::rule::{GrammarRule, RuleBuilder, SemanticProperties};
use crate::slots::TypedSlotValue;
use crate::tokenizer::Token;

// =============================================================================
// Rule Set
// =============================================================================

/// Registered rules, sorted by priority and indexed by action.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Arc<GrammarRule>>,
    by_action: HashMap<String, Vec<Arc<GrammarRule>>>,
    next_sequence: u64,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule, replacing any rule with the same key.
    ///
    /// A replacement takes over the registration slot of the rule it
    /// replaces, so it keeps that rule's place among equal priorities.
    pub fn insert(&mut self, mut rule: GrammarRule) -> Arc<GrammarRule> {
        let replaced = rule.key.as_ref().and_then(|key| {
            let index = self.rules.iter().position(|r| r.key.as_ref() == Some(key))?;
            debug!(key = %key, "replacing grammar rule");
            Some(self.rules.remove(index).sequence)
        });
        rule.sequence = replaced.unwrap_or_else(|| {
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            sequence
        });

        let rule = Arc::new(rule);
        self.rules.push(Arc::clone(&rule));
        // Equal priorities keep registration order.
        self.rules
            .sort_by(|a, b| b.priority.cmp(&a.priority).then(a.sequence.cmp(&b.sequence)));
        self.reindex();
        rule
    }

    fn reindex(&mut self) {
        self.by_action.clear();
        for rule in &self.rules {
            self.by_action
                .entry(rule.action.clone())
                .or_default()
                .push(Arc::clone(rule));
        }
    }

    /// All rules, highest priority first.
    #[must_use]
    pub fn rules(&self) -> &[Arc<GrammarRule>] {
        &self.rules
    }

    /// Rules targeting `action`, highest priority first.
    #[must_use]
    pub fn for_action(&self, action: &str) -> &[Arc<GrammarRule>] {
        self.by_action.get(action).map_or(&[], Vec::as_slice)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Removes every rule and index entry.
    pub fn clear(&mut self) {
        self.rules.clear();
        self.by_action.clear();
    }
}

// =============================================================================
// Match Results
// =============================================================================

/// Limits applied to a match search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchOptions {
    /// Matches below this confidence are dropped.
    pub min_confidence: f64,
    /// At most this many matches are returned.
    pub max_matches: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_confidence: 0.1,
            max_matches: 10,
        }
    }
}

impl MatchOptions {
    /// Sets the minimum confidence.
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Sets the maximum number of matches.
    #[must_use]
    pub fn with_max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = max_matches;
        self
    }
}

/// What one slot consumed and resolved to.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotMatch {
    /// Input token indices consumed.
    pub tokens: Vec<usize>,
    /// Consumed words joined by spaces.
    pub text: String,
    /// The slot's type.
    pub slot_type: SlotType,
    /// 1.0 resolved, 0.9 ambiguous, 0.5 unresolved.
    pub confidence: f64,
    /// Resolved entities (entity slots).
    pub entities: Vec<EntityId>,
    /// Equally good candidates when ambiguous.
    pub candidates: Vec<EntityId>,
    /// From an "all" phrase.
    pub is_all: bool,
    /// From an "X and Y" list.
    pub is_list: bool,
    /// Phrases of a list.
    pub items: Vec<String>,
    /// Entities removed by "all but".
    pub excluded: Vec<EntityId>,
    /// The slot was a pronoun.
    pub is_pronoun: bool,
    /// Parsed value (typed slots).
    pub value: Option<TypedSlotValue>,
}

impl SlotMatch {
    /// A slot match over `tokens` with no resolution yet.
    #[must_use]
    pub fn new(tokens: Vec<usize>, text: impl Into<String>, slot_type: SlotType) -> Self {
        Self {
            tokens,
            text: text.into(),
            slot_type,
            confidence: 1.0,
            entities: Vec::new(),
            candidates: Vec::new(),
            is_all: false,
            is_list: false,
            items: Vec::new(),
            excluded: Vec::new(),
            is_pronoun: false,
            value: None,
        }
    }

    /// Sets a typed value.
    #[must_use]
    pub fn with_value(mut self, value: TypedSlotValue) -> Self {
        self.value = Some(value);
        self
    }

    /// First resolved entity.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        self.entities.first().copied()
    }

    /// Entity slot with more than one equally good candidate.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.entities.is_empty() && self.candidates.len() > 1
    }

    /// Entity slot that found nothing.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.slot_type.is_entity() && self.entities.is_empty() && self.candidates.is_empty()
    }

    /// Refers to several entities.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.is_all || self.is_list || self.entities.len() > 1
    }
}

/// The words of the input that anchored a match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchedTokens {
    /// The word matched by the first pattern token.
    pub verb: Option<String>,
    /// The first preposition matched by a literal.
    pub preposition: Option<String>,
    /// The direction word, if any.
    pub direction: Option<String>,
}

/// A rule that matched the input.
#[derive(Clone, Debug)]
pub struct PatternMatch {
    /// The rule.
    pub rule: Arc<GrammarRule>,
    /// Product of slot confidences and optional-skip penalties.
    pub confidence: f64,
    /// Slot name to match.
    pub slots: BTreeMap<String, SlotMatch>,
    /// Input tokens consumed (always the whole input).
    pub consumed: usize,
    /// Derived semantics.
    pub semantics: SemanticProperties,
    /// Anchor words.
    pub matched: MatchedTokens,
}

impl PatternMatch {
    /// Target action id.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.rule.action
    }

    /// Looks up a slot.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&SlotMatch> {
        self.slots.get(name)
    }

    /// Ranking: confidence desc, priority desc, registration order asc.
    #[must_use]
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .confidence
            .total_cmp(&self.confidence)
            .then_with(|| other.rule.priority.cmp(&self.rule.priority))
            .then_with(|| self.rule.sequence.cmp(&other.rule.sequence))
    }
}

/// Filters, sorts and truncates raw matches.
pub fn rank_matches(mut matches: Vec<PatternMatch>, options: &MatchOptions) -> Vec<PatternMatch> {
    matches.retain(|m| m.confidence >= options.min_confidence);
    matches.sort_by(PatternMatch::rank);
    matches.truncate(options.max_matches);
    matches
}

// =============================================================================
// Engine Trait
// =============================================================================

/// A grammar engine: owns rules and matches tokens against them.
pub trait GrammarEngine {
    /// The engine's rules.
    fn rule_set(&self) -> &RuleSet;

    /// The engine's rules, mutably.
    fn rule_set_mut(&mut self) -> &mut RuleSet;

    /// All matches for the tokens, ranked and limited by `options`.
    fn find_matches(
        &self,
        tokens: &[Token],
        context: &GrammarContext<'_>,
        options: &MatchOptions,
    ) -> Vec<PatternMatch>;

    /// Builds and registers a rule.
    ///
    /// # Errors
    ///
    /// Returns the build error if the rule is malformed.
    fn add_rule(&mut self, rule: RuleBuilder) -> Result<Arc<GrammarRule>> {
        let rule = rule.build()?;
        debug!(pattern = %rule.pattern, action = %rule.action, priority = rule.priority, "grammar rule added");
        Ok(self.rule_set_mut().insert(rule))
    }

    /// Builds and registers several rules, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first build error.
    fn add_rules(&mut self, rules: impl IntoIterator<Item = RuleBuilder>) -> Result<()>
    where
        Self: Sized,
    {
        for rule in rules {
            self.add_rule(rule)?;
        }
        Ok(())
    }

    /// The highest-ranked match.
    fn best_match(
        &self,
        tokens: &[Token],
        context: &GrammarContext<'_>,
        options: &MatchOptions,
    ) -> Option<PatternMatch> {
        self.find_matches(tokens, context, options).into_iter().next()
    }

    /// All rules, highest priority first.
    fn rules(&self) -> &[Arc<GrammarRule>] {
        self.rule_set().rules()
    }

    /// Rules targeting an action.
    fn rules_for_action(&self, action: &str) -> &[Arc<GrammarRule>] {
        self.rule_set().for_action(action)
    }

    /// Removes every rule.
    fn clear(&mut self) {
        self.rule_set_mut().clear();
    }
}

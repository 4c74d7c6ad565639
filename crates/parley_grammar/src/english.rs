//! English grammar engine.
//!
//! Aligns input tokens against each rule's compiled pattern with
//! backtracking:
//!
//! - literals and alternates match a token's normalized form
//! - an optional run is either matched or skipped as a whole (×0.9)
//! - entity slots extend up to the next anchor; adjacent slots take the
//!   shortest span that resolves
//! - greedy slots run to the next anchor or the end of input
//! - typed slots parse one token (or one quoted span)
//!
//! Every input token must be consumed. The first alignment found for a rule
//! is its match.

use std::collections::BTreeMap;
use std::sync::Arc;

use parley_foundation::{EntityId, Result};
use tracing::{debug, trace};

use crate::context::GrammarContext;
use crate::engine::{
    GrammarEngine, MatchOptions, MatchedTokens, PatternMatch, RuleSet, SlotMatch, rank_matches,
};
use crate::pattern::{PatternToken, SlotType};
use crate::pronouns::PronounState;
use crate::rule::GrammarRule;
use crate::scope::{ScopeConstraint, ScopeResolver, SlotResolution};
use crate::slots::{self, TypedSlotValue};
use crate::tokenizer::{Lexicon, PartOfSpeech, Token, join_words};
use crate::vocabulary::{VocabularyDefinition, VocabularyProvider};

/// Confidence multiplier for each skipped optional run.
const OPTIONAL_SKIP_PENALTY: f64 = 0.9;
/// Entity slot with several equally good candidates.
const AMBIGUOUS_CONFIDENCE: f64 = 0.9;
/// Entity slot that found nothing in scope.
const UNRESOLVED_CONFIDENCE: f64 = 0.5;

/// Grammar engine for English commands.
#[derive(Clone, Debug)]
pub struct EnglishGrammarEngine {
    rules: RuleSet,
    vocabulary: VocabularyProvider,
    scope: ScopeResolver,
    lexicon: Lexicon,
}

impl Default for EnglishGrammarEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EnglishGrammarEngine {
    /// Creates an engine with the English lexicon and no rules.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: RuleSet::new(),
            vocabulary: VocabularyProvider::new(),
            scope: ScopeResolver::new(),
            lexicon: Lexicon::english(),
        }
    }

    /// Tokenizes input with this engine's lexicon.
    #[must_use]
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        self.lexicon.tokenize(input)
    }

    /// The lexicon.
    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// The lexicon, mutably.
    pub fn lexicon_mut(&mut self) -> &mut Lexicon {
        &mut self.lexicon
    }

    /// Vocabulary categories.
    #[must_use]
    pub fn vocabulary(&self) -> &VocabularyProvider {
        &self.vocabulary
    }

    /// Vocabulary categories, mutably.
    pub fn vocabulary_mut(&mut self) -> &mut VocabularyProvider {
        &mut self.vocabulary
    }

    /// Shorthand for defining a vocabulary category.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyExists` if the category is already defined.
    pub fn define_vocabulary(&mut self, category: &str, definition: VocabularyDefinition) -> Result<()> {
        self.vocabulary.define(category, definition)
    }

    /// The scope resolver.
    #[must_use]
    pub fn scope(&self) -> &ScopeResolver {
        &self.scope
    }

    /// The scope resolver, mutably (to register extensions).
    pub fn scope_mut(&mut self) -> &mut ScopeResolver {
        &mut self.scope
    }

    fn match_rule(
        &self,
        rule: &Arc<GrammarRule>,
        tokens: &[Token],
        context: &GrammarContext<'_>,
    ) -> Option<PatternMatch> {
        let matcher = Matcher {
            engine: self,
            rule,
            tokens,
            context,
        };
        let alignment = matcher.align(0, 0, Alignment::default())?;
        Some(matcher.finish(rule, alignment))
    }
}

impl GrammarEngine for EnglishGrammarEngine {
    fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    fn rule_set_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    fn find_matches(
        &self,
        tokens: &[Token],
        context: &GrammarContext<'_>,
        options: &MatchOptions,
    ) -> Vec<PatternMatch> {
        if tokens.is_empty() {
            return Vec::new();
        }
        let count = tokens.len();
        let mut matches = Vec::new();
        for rule in self.rules.rules() {
            let compiled = &rule.compiled;
            if compiled.min_tokens > count || compiled.max_tokens.is_some_and(|max| max < count) {
                continue;
            }
            if let Some(found) = self.match_rule(rule, tokens, context) {
                trace!(rule = %rule.id(), confidence = found.confidence, "rule matched");
                matches.push(found);
            }
        }
        let raw = matches.len();
        let ranked = rank_matches(matches, options);
        debug!(tokens = count, raw, kept = ranked.len(), "grammar matching");
        ranked
    }
}

// =============================================================================
// Alignment
// =============================================================================

#[derive(Clone, Debug, Default)]
struct Alignment {
    slots: BTreeMap<String, SlotMatch>,
    bound: BTreeMap<String, Vec<EntityId>>,
    skipped: i32,
    /// (pattern index, token index) for each matched anchor.
    anchors: Vec<(usize, usize)>,
}

struct Matcher<'m, 'c> {
    engine: &'m EnglishGrammarEngine,
    rule: &'m GrammarRule,
    tokens: &'m [Token],
    context: &'m GrammarContext<'c>,
}

impl Matcher<'_, '_> {
    fn align(&self, pi: usize, ti: usize, state: Alignment) -> Option<Alignment> {
        let pattern = &self.rule.compiled.tokens;
        let Some(pt) = pattern.get(pi) else {
            return (ti == self.tokens.len()).then_some(state);
        };

        if pt.is_anchor() {
            if let Some(token) = self.tokens.get(ti) {
                if pt.accepts(&token.normalized) {
                    let mut next = state.clone();
                    next.anchors.push((pi, ti));
                    if let Some(done) = self.align(pi + 1, ti + 1, next) {
                        return Some(done);
                    }
                }
            }
        } else if let Some(name) = pt.slot_name() {
            for (end, slot) in self.slot_spans(pi, name, ti, &state) {
                let mut next = state.clone();
                if !slot.entities.is_empty() {
                    next.bound.insert(name.to_string(), slot.entities.clone());
                }
                next.slots.insert(name.to_string(), slot);
                if let Some(done) = self.align(pi + 1, end, next) {
                    return Some(done);
                }
            }
        }

        // A run is skipped only from its first token; once entered it must match whole.
        if pt.optional && (pi == 0 || !pattern[pi - 1].optional) {
            let run = pattern[pi..].iter().take_while(|t| t.optional).count();
            let mut next = state;
            next.skipped += 1;
            return self.align(pi + run, ti, next);
        }
        None
    }

    /// Candidate (end, match) pairs for a slot starting at `ti`.
    fn slot_spans(&self, pi: usize, name: &str, ti: usize, state: &Alignment) -> Vec<(usize, SlotMatch)> {
        let Some(token) = self.tokens.get(ti) else {
            return Vec::new();
        };
        let slot_type = self
            .rule
            .slot_type(name)
            .cloned()
            .unwrap_or(SlotType::Entity);

        match &slot_type {
            SlotType::Entity | SlotType::Instrument => self.entity_spans(pi, name, ti, state, &slot_type),
            SlotType::TextGreedy | SlotType::Topic => {
                let end = self.greedy_end(pi, ti);
                let text = self.raw_text(ti, end);
                let mut slot = SlotMatch::new((ti..end).collect(), text.clone(), slot_type.clone());
                if slot_type == SlotType::Topic {
                    slot = slot.with_value(TypedSlotValue::Topic(text));
                }
                vec![(end, slot)]
            }
            SlotType::QuotedText => self.quoted_span(ti).into_iter().collect(),
            SlotType::Text => vec![(
                ti + 1,
                SlotMatch::new(vec![ti], token.word.clone(), SlotType::Text),
            )],
            _ => self
                .typed_value(&slot_type, token)
                .map(|value| {
                    let slot = SlotMatch::new(vec![ti], token.word.clone(), slot_type.clone())
                        .with_value(value);
                    (ti + 1, slot)
                })
                .into_iter()
                .collect(),
        }
    }

    fn typed_value(&self, slot_type: &SlotType, token: &Token) -> Option<TypedSlotValue> {
        let word = token.normalized.as_str();
        match slot_type {
            SlotType::Direction => slots::parse_direction(word)
                .map(str::to_string)
                .or_else(|| token.mapping(PartOfSpeech::Direction).map(str::to_string))
                .map(TypedSlotValue::Direction),
            SlotType::Number => slots::parse_number(word).map(TypedSlotValue::Number),
            SlotType::Ordinal => slots::parse_ordinal(word).map(TypedSlotValue::Ordinal),
            SlotType::Time => slots::parse_time(word)
                .map(|(hours, minutes)| TypedSlotValue::Time { hours, minutes }),
            SlotType::Manner => slots::parse_manner(word)
                .map(str::to_string)
                .or_else(|| token.mapping(PartOfSpeech::Adverb).map(str::to_string))
                .map(TypedSlotValue::Manner),
            SlotType::Vocabulary(category) => self
                .engine
                .vocabulary
                .matches(category, word, self.context)
                .then(|| TypedSlotValue::Vocabulary {
                    category: category.clone(),
                    word: word.to_string(),
                }),
            _ => None,
        }
    }

    fn quoted_span(&self, ti: usize) -> Option<(usize, SlotMatch)> {
        let first = self.tokens.get(ti)?;
        let end = if first.is_quoted() {
            ti + 1
        } else if first.word.starts_with('"') {
            ti + 1 + self.tokens[ti..].iter().position(|t| t.word.ends_with('"'))?
        } else {
            return None;
        };
        let text = self.raw_text(ti, end);
        let inner = text.trim_matches('"').to_string();
        let slot = SlotMatch::new((ti..end).collect(), text, SlotType::QuotedText)
            .with_value(TypedSlotValue::QuotedText(inner));
        Some((end, slot))
    }

    /// End of a greedy slot: the next anchor's first occurrence, else the end.
    fn greedy_end(&self, pi: usize, ti: usize) -> usize {
        let n = self.tokens.len();
        let Some(anchor) = self.rule.compiled.tokens[pi + 1..].iter().find(|t| t.is_anchor()) else {
            return n;
        };
        (ti + 1..n)
            .find(|&j| anchor.accepts(&self.tokens[j].normalized))
            .unwrap_or(n)
    }

    fn entity_spans(
        &self,
        pi: usize,
        name: &str,
        ti: usize,
        state: &Alignment,
        slot_type: &SlotType,
    ) -> Vec<(usize, SlotMatch)> {
        let n = self.tokens.len();
        let rest = &self.rule.compiled.tokens[pi + 1..];

        // Tokens that may directly follow this slot: the next token and, when
        // that opens a new optional run, whatever follows the skipped run.
        let in_run = self.rule.compiled.tokens[pi].optional;
        let mut followers: Vec<Option<&PatternToken>> = vec![rest.first()];
        if !in_run && rest.first().is_some_and(|t| t.optional) {
            let run = rest.iter().take_while(|t| t.optional).count();
            followers.push(rest.get(run));
        }
        let mut stops: Vec<&PatternToken> = Vec::new();
        let mut adjacent_slot = false;
        let mut open_ended = false;
        for follower in followers {
            match follower {
                None => open_ended = true,
                Some(t) if t.is_anchor() => stops.push(t),
                Some(_) => adjacent_slot = true,
            }
        }
        let all_stops: Vec<&PatternToken> = rest.iter().filter(|t| t.is_anchor()).collect();

        let ends: Vec<usize> = if adjacent_slot {
            (ti + 1..=n).collect()
        } else {
            let mut ends: Vec<usize> = (ti + 1..n)
                .filter(|&j| stops.iter().any(|s| s.accepts(&self.tokens[j].normalized)))
                .collect();
            if open_ended {
                ends.push(n);
            }
            ends
        };
        // A span never ends on a word one of the remaining anchors wanted.
        let ends: Vec<usize> = ends
            .into_iter()
            .filter(|&end| {
                !all_stops
                    .iter()
                    .any(|s| s.accepts(&self.tokens[end - 1].normalized))
            })
            .collect();

        let mut spans: Vec<(usize, SlotMatch)> = ends
            .into_iter()
            .map(|end| (end, self.resolve_entity(name, ti, end, state, slot_type)))
            .collect();
        // Shortest span that resolves first; unresolved spans stay as fallbacks.
        spans.sort_by_key(|(_, slot)| slot.is_unresolved());
        spans
    }

    fn resolve_entity(
        &self,
        name: &str,
        start: usize,
        end: usize,
        state: &Alignment,
        slot_type: &SlotType,
    ) -> SlotMatch {
        let words: Vec<String> = self.tokens[start..end]
            .iter()
            .map(|t| t.normalized.clone())
            .collect();
        let mut local = self.context.clone();
        local.slots.clone_from(&state.bound);

        let default = ScopeConstraint::default();
        let constraint = self.rule.constraint(name).unwrap_or(&default);
        let resolution = self.engine.scope.resolve_slot(&words, constraint, &local);

        let mut slot = SlotMatch::new((start..end).collect(), join_words(&words), slot_type.clone());
        slot.is_pronoun = matches!(words.as_slice(), [w] if PronounState::is_pronoun(w));
        match resolution {
            SlotResolution::Unique(id) => slot.entities = vec![id],
            SlotResolution::Multiple {
                entities,
                excluded,
                is_all,
            } => {
                slot.is_all = is_all;
                slot.is_list = !is_all && !slot.is_pronoun;
                if slot.is_list {
                    slot.items = words
                        .split(|w| w == "and" || w == ",")
                        .map(|p| p.join(" "))
                        .filter(|p| !p.is_empty())
                        .collect();
                }
                slot.entities = entities;
                slot.excluded = excluded;
            }
            SlotResolution::Ambiguous { candidates, .. } => {
                slot.confidence = AMBIGUOUS_CONFIDENCE;
                slot.candidates = candidates;
            }
            SlotResolution::NotFound { .. } => slot.confidence = UNRESOLVED_CONFIDENCE,
        }
        slot
    }

    fn raw_text(&self, start: usize, end: usize) -> String {
        let words: Vec<&str> = self.tokens[start..end].iter().map(|t| t.word.as_str()).collect();
        join_words(&words)
    }

    fn finish(&self, rule: &Arc<GrammarRule>, alignment: Alignment) -> PatternMatch {
        let mut matched = MatchedTokens::default();
        for &(pi, ti) in &alignment.anchors {
            let token = &self.tokens[ti];
            if pi == 0 {
                matched.verb = Some(token.normalized.clone());
            } else if matched.preposition.is_none() && token.is(PartOfSpeech::Preposition) {
                matched.preposition = Some(token.normalized.clone());
            }
        }

        let mut direction_value = None;
        let mut manner_value = None;
        for slot in alignment.slots.values() {
            match &slot.value {
                Some(TypedSlotValue::Direction(d)) => {
                    matched.direction = Some(slot.text.to_lowercase());
                    direction_value = Some(d.clone());
                }
                Some(TypedSlotValue::Manner(m)) => manner_value = Some(m.clone()),
                _ => {}
            }
        }

        let mut semantics = rule.derive_semantics(
            matched.verb.as_deref(),
            matched.preposition.as_deref(),
            matched.direction.as_deref(),
        );
        if semantics.direction.is_none() {
            semantics.direction = direction_value;
        }
        if let Some(manner) = manner_value {
            semantics.manner = Some(manner);
        }

        let penalty = OPTIONAL_SKIP_PENALTY.powi(alignment.skipped);
        let confidence = alignment
            .slots
            .values()
            .map(|s| s.confidence)
            .product::<f64>()
            * penalty;

        PatternMatch {
            rule: Arc::clone(rule),
            confidence,
            slots: alignment.slots,
            consumed: self.tokens.len(),
            semantics,
            matched,
        }
    }
}

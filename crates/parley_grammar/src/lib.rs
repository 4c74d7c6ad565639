//! Grammar matching for interactive fiction commands.
//!
//! This crate turns player input like "put the coin into the jar" into ranked
//! [`PatternMatch`]es with their slots resolved against world scope.
//!
//! # Architecture
//!
//! ```text
//! "put the coin into the jar"
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   TOKENIZER     │  → [put, the, coin, into(prep), the, jar]
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ PATTERN         │  → "put|place :item in|into|inside :container"
//! │ ALIGNMENT       │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ SCOPE           │  → item=coin (carried), container=jar (touchable)
//! │ RESOLUTION      │
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ RANKING         │  → confidence desc, priority desc, registration asc
//! └─────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`tokenizer`] - Input tokens and the part-of-speech lexicon
//! - [`pattern`] - Pattern compilation
//! - [`vocabulary`] - Context-gated word categories
//! - [`rule`] - Grammar rules, semantics and the rule builder
//! - [`engine`] - Rule set, match results and the [`GrammarEngine`] trait
//! - [`english`] - The English alignment engine
//! - [`scope`] - Scope constraints and slot resolution
//! - [`noun_phrase`] - Noun phrase matching
//! - [`slots`] - Typed slot values
//! - [`pronouns`] - Pronoun tracking
//! - [`context`] - Read-only matching context
//! - [`stdlib`] - Standard rules

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod context;
pub mod engine;
pub mod english;
pub mod noun_phrase;
pub mod pattern;
pub mod pronouns;
pub mod rule;
pub mod scope;
pub mod slots;
pub mod stdlib;
pub mod tokenizer;
pub mod vocabulary;

pub use context::GrammarContext;
pub use engine::{GrammarEngine, MatchOptions, MatchedTokens, PatternMatch, RuleSet, SlotMatch};
pub use english::EnglishGrammarEngine;
pub use pattern::{CompiledPattern, PatternCompiler, PatternToken, PatternTokenKind, SlotType};
pub use pronouns::PronounState;
pub use rule::{GrammarRule, RuleBuilder, SemanticMapping, SemanticProperties, SlotSpec};
pub use scope::{
    ScopeBase, ScopeConstraint, ScopeConstraintBuilder, ScopeFilter, ScopeResolver, SlotResolution,
};
pub use slots::TypedSlotValue;
pub use stdlib::register_standard_grammar;
pub use tokenizer::{Lexicon, PartOfSpeech, Token};
pub use vocabulary::{VocabularyDefinition, VocabularyProvider};

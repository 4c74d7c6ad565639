//! Grammar pattern compilation.
//!
//! Patterns are whitespace-separated token strings:
//!
//! ```text
//! put|place :item in|into|inside :container
//! unlock :door [with :key]
//! say :message... to :listener
//! ```
//!
//! - `:name` is a slot, `:name...` a greedy slot
//! - `a|b|c` is a set of alternates
//! - `[` ... `]` marks the enclosed tokens optional (no nesting)
//! - anything else is a literal, matched lowercase

use std::collections::BTreeMap;
use std::fmt;

use parley_foundation::{Error, Result};

/// What a slot accepts and how its tokens are interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotType {
    /// An entity resolved through scope.
    Entity,
    /// A single free-text token.
    Text,
    /// Free text up to the next anchor or end of input.
    TextGreedy,
    /// An entity used as a tool; resolved like [`SlotType::Entity`].
    Instrument,
    /// A compass or vertical direction.
    Direction,
    /// A cardinal number, digits or words.
    Number,
    /// An ordinal ("third", "3rd").
    Ordinal,
    /// A clock time (`HH:MM`).
    Time,
    /// A manner adverb ("carefully").
    Manner,
    /// A `"quoted"` span.
    QuotedText,
    /// Free text naming a topic; greedy.
    Topic,
    /// A word from the named vocabulary category.
    Vocabulary(String),
}

impl SlotType {
    /// Returns true for slot types resolved against world entities.
    #[must_use]
    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity | Self::Instrument)
    }

    /// Returns true for slot types that consume up to the next anchor.
    #[must_use]
    pub fn is_greedy(&self) -> bool {
        matches!(self, Self::TextGreedy | Self::Topic)
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => write!(f, "entity"),
            Self::Text => write!(f, "text"),
            Self::TextGreedy => write!(f, "text-greedy"),
            Self::Instrument => write!(f, "instrument"),
            Self::Direction => write!(f, "direction"),
            Self::Number => write!(f, "number"),
            Self::Ordinal => write!(f, "ordinal"),
            Self::Time => write!(f, "time"),
            Self::Manner => write!(f, "manner"),
            Self::QuotedText => write!(f, "quoted-text"),
            Self::Topic => write!(f, "topic"),
            Self::Vocabulary(category) => write!(f, "vocabulary:{category}"),
        }
    }
}

/// The shape of a compiled pattern token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternTokenKind {
    /// A word that must appear.
    Literal(String),
    /// Any one of several words.
    Alternates(Vec<String>),
    /// A named slot.
    Slot(String),
}

/// One compiled pattern token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternToken {
    /// Literal, alternates or slot.
    pub kind: PatternTokenKind,
    /// Inside an optional group.
    pub optional: bool,
    /// Written as `:name...`.
    pub greedy: bool,
    /// Slot type; `None` for literals and alternates.
    pub slot_type: Option<SlotType>,
}

impl PatternToken {
    /// Returns true if `word` satisfies this literal or alternates token.
    #[must_use]
    pub fn accepts(&self, word: &str) -> bool {
        match &self.kind {
            PatternTokenKind::Literal(lit) => lit == word,
            PatternTokenKind::Alternates(options) => options.iter().any(|o| o == word),
            PatternTokenKind::Slot(_) => false,
        }
    }

    /// Returns true for literals and alternates.
    #[must_use]
    pub fn is_anchor(&self) -> bool {
        !matches!(self.kind, PatternTokenKind::Slot(_))
    }

    /// Slot name, if this is a slot.
    #[must_use]
    pub fn slot_name(&self) -> Option<&str> {
        match &self.kind {
            PatternTokenKind::Slot(name) => Some(name),
            _ => None,
        }
    }
}

/// A compiled pattern ready for matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledPattern {
    /// Tokens in pattern order.
    pub tokens: Vec<PatternToken>,
    /// Slot name to index in `tokens`.
    pub slots: BTreeMap<String, usize>,
    /// Input tokens needed at minimum (one per required pattern token).
    pub min_tokens: usize,
    /// Upper bound on input tokens; `None` when a slot can absorb a phrase.
    pub max_tokens: Option<usize>,
}

impl CompiledPattern {
    /// Sets the type of a named slot. Returns false if the slot does not exist.
    pub fn set_slot_type(&mut self, name: &str, slot_type: SlotType) -> bool {
        match self.slots.get(name) {
            Some(&index) => {
                self.tokens[index].slot_type = Some(slot_type);
                true
            }
            None => false,
        }
    }

    /// Type of a named slot.
    #[must_use]
    pub fn slot_type(&self, name: &str) -> Option<&SlotType> {
        self.slots
            .get(name)
            .and_then(|&i| self.tokens[i].slot_type.as_ref())
    }
}

/// Compiles pattern strings.
pub struct PatternCompiler;

impl PatternCompiler {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns `PatternSyntax` for an empty pattern, an empty alternative,
    /// unbalanced or nested brackets, an empty slot name or a duplicate slot.
    pub fn compile(pattern: &str) -> Result<CompiledPattern> {
        let raw: Vec<&str> = pattern.split_whitespace().collect();
        if raw.is_empty() {
            return Err(Error::pattern_syntax(pattern, 0, "empty pattern"));
        }

        let fail = |position: usize, message: &str| Error::pattern_syntax(pattern, position, message);

        let mut tokens = Vec::new();
        let mut slots = BTreeMap::new();
        let mut in_optional = false;
        let mut group_start = 0;
        let mut has_slot = false;

        for (position, word) in raw.iter().enumerate() {
            let mut body = *word;

            if let Some(rest) = body.strip_prefix('[') {
                if in_optional {
                    return Err(fail(position, "nested optional group"));
                }
                in_optional = true;
                group_start = tokens.len();
                body = rest;
            }
            let closes = match body.strip_suffix(']') {
                Some(rest) => {
                    if !in_optional {
                        return Err(fail(position, "unbalanced ']'"));
                    }
                    body = rest;
                    true
                }
                None => false,
            };
            if body.contains('[') {
                return Err(fail(position, "nested optional group"));
            }
            if body.contains(']') {
                return Err(fail(position, "unbalanced ']'"));
            }

            if !body.is_empty() {
                let token = Self::compile_token(body, in_optional)
                    .map_err(|message| fail(position, message))?;
                if let Some(name) = token.slot_name() {
                    if slots.insert(name.to_string(), tokens.len()).is_some() {
                        return Err(fail(position, "duplicate slot name"));
                    }
                    has_slot = true;
                }
                tokens.push(token);
            }

            if closes {
                if tokens.len() == group_start {
                    return Err(fail(position, "empty optional group"));
                }
                in_optional = false;
            }
        }

        if in_optional {
            return Err(fail(raw.len() - 1, "unclosed optional group"));
        }
        if tokens.is_empty() {
            return Err(fail(0, "empty pattern"));
        }

        let min_tokens = tokens.iter().filter(|t| !t.optional).count();
        let max_tokens = (!has_slot).then_some(tokens.len());

        Ok(CompiledPattern {
            tokens,
            slots,
            min_tokens,
            max_tokens,
        })
    }

    fn compile_token(body: &str, optional: bool) -> std::result::Result<PatternToken, &'static str> {
        if let Some(name) = body.strip_prefix(':') {
            let (name, greedy) = match name.strip_suffix("...") {
                Some(n) => (n, true),
                None => (name, false),
            };
            if name.is_empty() {
                return Err("empty slot name");
            }
            return Ok(PatternToken {
                kind: PatternTokenKind::Slot(name.to_string()),
                optional,
                greedy,
                slot_type: Some(if greedy {
                    SlotType::TextGreedy
                } else {
                    SlotType::Entity
                }),
            });
        }

        let kind = if body.contains('|') {
            let options: Vec<String> = body.split('|').map(str::to_lowercase).collect();
            if options.iter().any(String::is_empty) {
                return Err("empty alternative");
            }
            PatternTokenKind::Alternates(options)
        } else {
            PatternTokenKind::Literal(body.to_lowercase())
        };

        Ok(PatternToken {
            kind,
            optional,
            greedy: false,
            slot_type: None,
        })
    }

    /// Returns true if the pattern compiles.
    #[must_use]
    pub fn validate(pattern: &str) -> bool {
        Self::compile(pattern).is_ok()
    }

    /// Slot names in pattern order, without compiling.
    #[must_use]
    pub fn extract_slots(pattern: &str) -> Vec<String> {
        pattern
            .split_whitespace()
            .map(|w| w.trim_start_matches('[').trim_end_matches(']'))
            .filter_map(|w| w.strip_prefix(':'))
            .map(|w| w.trim_end_matches("...").to_string())
            .filter(|w| !w.is_empty())
            .collect()
    }
}

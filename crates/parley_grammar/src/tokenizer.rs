//! Input tokenization.
//!
//! Converts raw player input into a stream of [`Token`]s, each tagged with the
//! parts of speech the [`Lexicon`] knows for it.

use std::collections::HashMap;

/// Part of speech for a lexicon entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartOfSpeech {
    /// Action word ("take").
    Verb,
    /// Thing word ("lamp").
    Noun,
    /// Qualifier ("brass").
    Adjective,
    /// Relation word ("in", "with").
    Preposition,
    /// Compass or vertical direction.
    Direction,
    /// "the", "a", "an".
    Article,
    /// "it", "them".
    Pronoun,
    /// "and", "but", "except".
    Conjunction,
    /// "all", "every".
    Determiner,
    /// Adverb of manner ("carefully").
    Adverb,
    /// Number word or digits.
    Number,
}

/// Where a lexicon entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateSource {
    /// Built-in English tables.
    Builtin,
    /// Added by the story.
    Story,
}

/// One possible reading of a token.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Part of speech.
    pub part_of_speech: PartOfSpeech,
    /// Canonical form ("n" maps to "north").
    pub mapping: String,
    /// Higher wins when readings compete.
    pub priority: i32,
    /// Origin of the entry.
    pub source: CandidateSource,
}

/// A token from player input.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// Word as typed (quoted spans keep their quotes).
    pub word: String,
    /// Lowercase form used for matching.
    pub normalized: String,
    /// Zero-based token position.
    pub position: usize,
    /// Lexicon readings, highest priority first.
    pub candidates: Vec<Candidate>,
}

impl Token {
    /// Returns true if any reading has the given part of speech.
    #[must_use]
    pub fn is(&self, part_of_speech: PartOfSpeech) -> bool {
        self.candidates
            .iter()
            .any(|c| c.part_of_speech == part_of_speech)
    }

    /// Canonical mapping for the given part of speech, if any.
    #[must_use]
    pub fn mapping(&self, part_of_speech: PartOfSpeech) -> Option<&str> {
        self.candidates
            .iter()
            .find(|c| c.part_of_speech == part_of_speech)
            .map(|c| c.mapping.as_str())
    }

    /// Returns true if the word is wrapped in double quotes.
    #[must_use]
    pub fn is_quoted(&self) -> bool {
        self.word.len() >= 2 && self.word.starts_with('"') && self.word.ends_with('"')
    }
}

/// Word tables used to tag tokens.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    entries: HashMap<String, Vec<Candidate>>,
}

const ARTICLES: &[&str] = &["the", "a", "an", "some"];
const PREPOSITIONS: &[&str] = &[
    "in", "into", "inside", "on", "onto", "with", "using", "from", "to", "at", "under",
    "behind", "through", "about", "off", "out", "up", "down", "over",
];
const PRONOUNS: &[&str] = &["it", "him", "her", "them"];
const CONJUNCTIONS: &[&str] = &["and", "but", "except"];
const DETERMINERS: &[&str] = &["all", "every", "each"];

impl Lexicon {
    /// Creates an empty lexicon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a lexicon preloaded with English function words and directions.
    #[must_use]
    pub fn english() -> Self {
        let mut lexicon = Self::new();
        for word in ARTICLES {
            lexicon.add_builtin(word, PartOfSpeech::Article, word);
        }
        for word in PREPOSITIONS {
            lexicon.add_builtin(word, PartOfSpeech::Preposition, word);
        }
        for word in PRONOUNS {
            lexicon.add_builtin(word, PartOfSpeech::Pronoun, word);
        }
        for word in CONJUNCTIONS {
            lexicon.add_builtin(word, PartOfSpeech::Conjunction, word);
        }
        for word in DETERMINERS {
            lexicon.add_builtin(word, PartOfSpeech::Determiner, word);
        }
        for (word, canonical) in crate::slots::DIRECTIONS {
            lexicon.add_builtin(word, PartOfSpeech::Direction, canonical);
        }
        for word in crate::slots::MANNERS {
            lexicon.add_builtin(word, PartOfSpeech::Adverb, word);
        }
        lexicon
    }

    fn add_builtin(&mut self, word: &str, part_of_speech: PartOfSpeech, mapping: &str) {
        self.insert(
            word,
            Candidate {
                part_of_speech,
                mapping: mapping.to_string(),
                priority: 0,
                source: CandidateSource::Builtin,
            },
        );
    }

    /// Adds a story word.
    pub fn add(&mut self, word: &str, part_of_speech: PartOfSpeech, mapping: &str, priority: i32) {
        self.insert(
            word,
            Candidate {
                part_of_speech,
                mapping: mapping.to_lowercase(),
                priority,
                source: CandidateSource::Story,
            },
        );
    }

    fn insert(&mut self, word: &str, candidate: Candidate) {
        let readings = self.entries.entry(word.to_lowercase()).or_default();
        readings.retain(|c| c.part_of_speech != candidate.part_of_speech);
        readings.push(candidate);
        readings.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Readings for a word, highest priority first.
    #[must_use]
    pub fn lookup(&self, word: &str) -> &[Candidate] {
        self.entries.get(word).map_or(&[], Vec::as_slice)
    }

    /// Converts raw input into tokens.
    ///
    /// - Splits on whitespace
    /// - Strips trailing sentence punctuation (but keeps `:` inside times)
    /// - Keeps each comma between words as its own `,` token
    /// - Keeps a quoted span as a single token, quotes included
    /// - Tags digit strings as numbers
    #[must_use]
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut words = Vec::new();
        let mut chars = input.chars().peekable();
        let mut current = String::new();

        while let Some(ch) = chars.next() {
            match ch {
                '"' => {
                    flush(&mut current, &mut words);
                    let mut quoted = String::from('"');
                    for c in chars.by_ref() {
                        if c == '"' {
                            break;
                        }
                        quoted.push(c);
                    }
                    quoted.push('"');
                    words.push(quoted);
                }
                c if c.is_whitespace() => flush(&mut current, &mut words),
                ',' => {
                    flush(&mut current, &mut words);
                    // Commas separate list items; a leading or doubled one says nothing.
                    if words.last().is_some_and(|w| w != ",") {
                        words.push(",".to_string());
                    }
                }
                '.' | '!' | '?' | ';' => {
                    // A period between digits is kept ("1.5" is not a command).
                    if ch == '.'
                        && current.chars().last().is_some_and(|c| c.is_ascii_digit())
                        && chars.peek().is_some_and(char::is_ascii_digit)
                    {
                        current.push(ch);
                    } else {
                        flush(&mut current, &mut words);
                    }
                }
                _ => current.push(ch),
            }
        }
        flush(&mut current, &mut words);
        if words.last().is_some_and(|w| w == ",") {
            words.pop();
        }

        words
            .into_iter()
            .enumerate()
            .map(|(position, word)| self.make_token(word, position))
            .collect()
    }

    fn make_token(&self, word: String, position: usize) -> Token {
        let normalized = word.trim_matches('"').to_lowercase();
        let mut candidates = self.lookup(&normalized).to_vec();
        if !normalized.is_empty() && normalized.chars().all(|c| c.is_ascii_digit()) {
            candidates.push(Candidate {
                part_of_speech: PartOfSpeech::Number,
                mapping: normalized.clone(),
                priority: 0,
                source: CandidateSource::Builtin,
            });
        }
        Token {
            word,
            normalized,
            position,
            candidates,
        }
    }
}

/// Joins words with spaces, attaching comma tokens to the word before.
#[must_use]
pub fn join_words<S: AsRef<str>>(words: &[S]) -> String {
    let mut out = String::new();
    for word in words {
        let word = word.as_ref();
        if !out.is_empty() && word != "," {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn flush(current: &mut String, words: &mut Vec<String>) {
    let trimmed = current.trim_matches(|c| c == ':' || c == '\'');
    if !trimmed.is_empty() {
        words.push(trimmed.to_string());
    }
    current.clear();
}

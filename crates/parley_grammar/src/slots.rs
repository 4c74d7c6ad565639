//! Typed slot values and their word tables.
//!
//! Typed slots bypass entity resolution: the tokens they consume are parsed
//! into a [`TypedSlotValue`] directly.

use std::fmt;

/// Direction words and the canonical direction each maps to.
pub const DIRECTIONS: &[(&str, &str)] = &[
    ("n", "north"),
    ("north", "north"),
    ("s", "south"),
    ("south", "south"),
    ("e", "east"),
    ("east", "east"),
    ("w", "west"),
    ("west", "west"),
    ("ne", "northeast"),
    ("northeast", "northeast"),
    ("nw", "northwest"),
    ("northwest", "northwest"),
    ("se", "southeast"),
    ("southeast", "southeast"),
    ("sw", "southwest"),
    ("southwest", "southwest"),
    ("u", "up"),
    ("up", "up"),
    ("d", "down"),
    ("down", "down"),
    ("in", "in"),
    ("inside", "in"),
    ("out", "out"),
    ("outside", "out"),
];

/// Adverbs recognized by manner slots.
pub const MANNERS: &[&str] = &[
    "carefully",
    "quickly",
    "slowly",
    "quietly",
    "loudly",
    "gently",
    "forcefully",
    "roughly",
    "softly",
    "firmly",
];

const NUMBER_WORDS: &[(&str, i64)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
    ("thirteen", 13),
    ("fourteen", 14),
    ("fifteen", 15),
    ("sixteen", 16),
    ("seventeen", 17),
    ("eighteen", 18),
    ("nineteen", 19),
    ("twenty", 20),
    ("thirty", 30),
    ("forty", 40),
    ("fifty", 50),
    ("sixty", 60),
    ("seventy", 70),
    ("eighty", 80),
    ("ninety", 90),
    ("hundred", 100),
];

const ORDINAL_WORDS: &[&str] = &[
    "first",
    "second",
    "third",
    "fourth",
    "fifth",
    "sixth",
    "seventh",
    "eighth",
    "ninth",
    "tenth",
    "eleventh",
    "twelfth",
    "thirteenth",
    "fourteenth",
    "fifteenth",
    "sixteenth",
    "seventeenth",
    "eighteenth",
    "nineteenth",
    "twentieth",
];

/// Value produced by a typed slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypedSlotValue {
    /// Canonical direction ("north").
    Direction(String),
    /// Cardinal number.
    Number(i64),
    /// One-based ordinal.
    Ordinal(u32),
    /// Clock time.
    Time {
        /// 0 to 23.
        hours: u8,
        /// 0 to 59.
        minutes: u8,
    },
    /// Manner adverb ("carefully").
    Manner(String),
    /// Text inside quotes, quotes removed.
    QuotedText(String),
    /// Free text naming a subject of conversation.
    Topic(String),
    /// A word from a vocabulary category.
    Vocabulary {
        /// Category name.
        category: String,
        /// The matched word, lowercase.
        word: String,
    },
}

impl fmt::Display for TypedSlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direction(d) | Self::Manner(d) | Self::QuotedText(d) | Self::Topic(d) => {
                write!(f, "{d}")
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Ordinal(n) => write!(f, "#{n}"),
            Self::Time { hours, minutes } => write!(f, "{hours:02}:{minutes:02}"),
            Self::Vocabulary { word, .. } => write!(f, "{word}"),
        }
    }
}

/// Maps a direction word to its canonical form.
#[must_use]
pub fn parse_direction(word: &str) -> Option<&'static str> {
    DIRECTIONS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, canonical)| *canonical)
}

/// Parses digits or a number word ("seven", "hundred").
#[must_use]
pub fn parse_number(word: &str) -> Option<i64> {
    if let Ok(n) = word.parse::<i64>() {
        return Some(n);
    }
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, n)| *n)
}

/// Parses "first".."twentieth" or the numeric forms "1st", "22nd", "3rd", "11th".
#[must_use]
pub fn parse_ordinal(word: &str) -> Option<u32> {
    if let Some(index) = ORDINAL_WORDS.iter().position(|w| *w == word) {
        return u32::try_from(index + 1).ok();
    }
    let digits_end = word.find(|c: char| !c.is_ascii_digit())?;
    let (digits, suffix) = word.split_at(digits_end);
    let n: u32 = digits.parse().ok()?;
    if n == 0 {
        return None;
    }
    (suffix == ordinal_suffix(n)).then_some(n)
}

fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Parses `HH:MM` with hours 0-23 and minutes 0-59.
#[must_use]
pub fn parse_time(word: &str) -> Option<(u8, u8)> {
    let (h, m) = word.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let hours: u8 = h.parse().ok()?;
    let minutes: u8 = m.parse().ok()?;
    (hours <= 23 && minutes <= 59).then_some((hours, minutes))
}

/// Returns the word if it is a known manner adverb.
#[must_use]
pub fn parse_manner(word: &str) -> Option<&'static str> {
    MANNERS.iter().find(|m| **m == word).copied()
}

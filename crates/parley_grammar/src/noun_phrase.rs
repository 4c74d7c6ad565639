//! Noun phrase representation and matching.
//!
//! Handles phrases like "the brass lamp" or "old key". Scope resolution uses
//! this to pick entities out of a candidate set.

use parley_foundation::EntityId;
use parley_world::{Entity, WorldModel};

const DETERMINERS: &[&str] = &["the", "a", "an", "some", "my", "this", "that"];

/// A parsed noun phrase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NounPhrase {
    /// Words before the head noun ("brass").
    pub adjectives: Vec<String>,
    /// Head noun ("lamp").
    pub noun: String,
}

impl NounPhrase {
    /// Creates a phrase with just a noun.
    #[must_use]
    pub fn new(noun: impl Into<String>) -> Self {
        Self {
            adjectives: Vec::new(),
            noun: noun.into(),
        }
    }

    /// Adds an adjective.
    #[must_use]
    pub fn with_adjective(mut self, adjective: impl Into<String>) -> Self {
        self.adjectives.push(adjective.into());
        self
    }

    /// Parses lowercase words, dropping leading determiners.
    ///
    /// Returns `None` when nothing is left.
    #[must_use]
    pub fn parse<S: AsRef<str>>(words: &[S]) -> Option<Self> {
        let words: Vec<&str> = words
            .iter()
            .map(AsRef::as_ref)
            .skip_while(|w| DETERMINERS.contains(w))
            .collect();
        let (noun, adjectives) = words.split_last()?;
        Some(Self {
            adjectives: adjectives.iter().map(|w| (*w).to_string()).collect(),
            noun: (*noun).to_string(),
        })
    }

    /// The phrase as typed, without determiners.
    #[must_use]
    pub fn text(&self) -> String {
        let mut words = self.adjectives.clone();
        words.push(self.noun.clone());
        words.join(" ")
    }
}

/// How well an entity matches a phrase. Lower is better.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// The whole phrase is the entity's name or an alias.
    Exact,
    /// The head noun names the entity and every other word qualifies it.
    Qualified,
    /// Every word appears somewhere in the entity's name, aliases or adjectives.
    Partial,
}

/// Scores an entity against a phrase.
#[must_use]
pub fn match_tier(entity: &Entity, phrase: &NounPhrase) -> Option<MatchTier> {
    let text = phrase.text();
    if entity.is_called(&text) {
        return Some(MatchTier::Exact);
    }

    let name = entity.name.to_lowercase();
    let name_words: Vec<&str> = name.split_whitespace().collect();
    let is_adjective = |word: &str| {
        entity.adjectives.iter().any(|a| &**a == word) || name_words.contains(&word)
    };

    let head_matches = name_words.last() == Some(&phrase.noun.as_str())
        || entity.aliases.iter().any(|a| **a == *phrase.noun);
    if head_matches && phrase.adjectives.iter().all(|a| is_adjective(a)) {
        return Some(MatchTier::Qualified);
    }

    let known = |word: &str| {
        is_adjective(word)
            || entity
                .aliases
                .iter()
                .any(|a| a.split_whitespace().any(|w| w == word))
    };
    if known(&phrase.noun) && phrase.adjectives.iter().all(|a| known(a)) {
        return Some(MatchTier::Partial);
    }
    None
}

/// Entities from `candidates` matching at the best available tier.
#[must_use]
pub fn best_matches(
    world: &dyn WorldModel,
    candidates: &[EntityId],
    phrase: &NounPhrase,
) -> Vec<EntityId> {
    let scored: Vec<(EntityId, MatchTier)> = candidates
        .iter()
        .filter_map(|id| {
            let entity = world.entity(*id)?;
            match_tier(entity, phrase).map(|tier| (*id, tier))
        })
        .collect();
    let Some(best) = scored.iter().map(|(_, tier)| *tier).min() else {
        return Vec::new();
    };
    scored
        .into_iter()
        .filter(|(_, tier)| *tier == best)
        .map(|(id, _)| id)
        .collect()
}

/// Describes an entity for disambiguation prompts ("brass lamp").
#[must_use]
pub fn describe(entity: &Entity) -> String {
    let name = entity.name.to_lowercase();
    let extra: Vec<&str> = entity
        .adjectives
        .iter()
        .map(|a| &**a)
        .filter(|a| !name.split_whitespace().any(|w| w == *a))
        .collect();
    if extra.is_empty() {
        name
    } else {
        format!("{} {name}", extra.join(" "))
    }
}

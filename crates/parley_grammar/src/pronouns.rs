//! Pronoun tracking state.
//!
//! Tracks referents for "it", "him", "her" and "them" across turns.

use parley_foundation::EntityId;

/// State for pronoun resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PronounState {
    it: Option<EntityId>,
    him: Option<EntityId>,
    her: Option<EntityId>,
    them: Vec<EntityId>,
}

impl PronounState {
    /// Creates a pronoun state with no referents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the "it" referent.
    pub fn set_it(&mut self, entity: EntityId) {
        self.it = Some(entity);
    }

    /// Sets the "him" referent.
    pub fn set_him(&mut self, entity: EntityId) {
        self.him = Some(entity);
    }

    /// Sets the "her" referent.
    pub fn set_her(&mut self, entity: EntityId) {
        self.her = Some(entity);
    }

    /// Sets the "them" referent.
    pub fn set_them(&mut self, entities: Vec<EntityId>) {
        self.them = entities;
    }

    /// Records the objects of a command: one object becomes "it", several "them".
    pub fn note_objects(&mut self, entities: &[EntityId]) {
        match entities {
            [] => {}
            [single] => self.it = Some(*single),
            many => self.them = many.to_vec(),
        }
    }

    /// Resolves a pronoun word to its referents.
    ///
    /// Returns `None` for unknown words and for pronouns with no referent.
    #[must_use]
    pub fn resolve(&self, word: &str) -> Option<Vec<EntityId>> {
        match word {
            "it" => self.it.map(|e| vec![e]),
            "him" => self.him.map(|e| vec![e]),
            "her" => self.her.map(|e| vec![e]),
            "them" if !self.them.is_empty() => Some(self.them.clone()),
            _ => None,
        }
    }

    /// Returns true if `word` is a tracked pronoun.
    #[must_use]
    pub fn is_pronoun(word: &str) -> bool {
        matches!(word, "it" | "him" | "her" | "them")
    }

    /// Forgets referents that no longer pass `alive`.
    pub fn retain(&mut self, alive: impl Fn(EntityId) -> bool) {
        self.it = self.it.filter(|e| alive(*e));
        self.him = self.him.filter(|e| alive(*e));
        self.her = self.her.filter(|e| alive(*e));
        self.them.retain(|e| alive(*e));
    }

    /// Clears all referents.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

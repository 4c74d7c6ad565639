//! Named, context-gated word categories.
//!
//! Stories define categories ("colors", "spells") that vocabulary slots match
//! against. A category may carry a `when` predicate; while it returns false,
//! the category matches nothing.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parley_foundation::{Error, Result};
use tracing::debug;

use crate::context::GrammarContext;

/// Gate deciding whether a category is active.
pub type VocabularyGate = Arc<dyn Fn(&GrammarContext<'_>) -> bool>;

/// Words for a new category, with an optional activation gate.
#[derive(Clone, Default)]
pub struct VocabularyDefinition {
    /// Member words.
    pub words: Vec<String>,
    /// Category is active only while this returns true.
    pub when: Option<VocabularyGate>,
}

impl VocabularyDefinition {
    /// Creates an always-active definition.
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            when: None,
        }
    }

    /// Gates the category on a predicate.
    #[must_use]
    pub fn when(mut self, gate: impl Fn(&GrammarContext<'_>) -> bool + 'static) -> Self {
        self.when = Some(Arc::new(gate));
        self
    }
}

impl fmt::Debug for VocabularyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocabularyDefinition")
            .field("words", &self.words)
            .field("gated", &self.when.is_some())
            .finish()
    }
}

#[derive(Clone)]
struct Category {
    words: Vec<String>,
    when: Option<VocabularyGate>,
}

impl Category {
    fn add(&mut self, words: impl IntoIterator<Item = String>) {
        for word in words {
            let word = word.to_lowercase();
            if !self.words.contains(&word) {
                self.words.push(word);
            }
        }
    }
}

/// Registry of vocabulary categories.
#[derive(Clone, Default)]
pub struct VocabularyProvider {
    categories: HashMap<String, Category>,
    order: Vec<String>,
}

impl VocabularyProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a new category.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyExists` if the category is already defined.
    pub fn define(&mut self, category: &str, definition: VocabularyDefinition) -> Result<()> {
        if self.categories.contains_key(category) {
            return Err(Error::vocabulary_exists(category));
        }
        let mut entry = Category {
            words: Vec::new(),
            when: definition.when,
        };
        entry.add(definition.words);
        debug!(category, words = entry.words.len(), "vocabulary defined");
        self.categories.insert(category.to_string(), entry);
        self.order.push(category.to_string());
        Ok(())
    }

    /// Adds words to an existing category.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyMissing` if the category is not defined.
    pub fn extend<I, S>(&mut self, category: &str, words: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .categories
            .get_mut(category)
            .ok_or_else(|| Error::vocabulary_missing(category))?;
        entry.add(words.into_iter().map(Into::into));
        Ok(())
    }

    /// True if the category exists, is active and contains `word`.
    #[must_use]
    pub fn matches(&self, category: &str, word: &str, context: &GrammarContext<'_>) -> bool {
        let Some(entry) = self.categories.get(category) else {
            return false;
        };
        if entry.when.as_ref().is_some_and(|gate| !gate(context)) {
            return false;
        }
        let word = word.to_lowercase();
        entry.words.contains(&word)
    }

    /// True if the category exists and its gate (if any) passes.
    #[must_use]
    pub fn is_active(&self, category: &str, context: &GrammarContext<'_>) -> bool {
        self.categories
            .get(category)
            .is_some_and(|entry| entry.when.as_ref().is_none_or(|gate| gate(context)))
    }

    /// True if the category is defined.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Copy of the category's words, in the order they were added.
    #[must_use]
    pub fn words(&self, category: &str) -> Vec<String> {
        self.categories
            .get(category)
            .map(|entry| entry.words.clone())
            .unwrap_or_default()
    }

    /// Removes a category. Returns true if it existed.
    pub fn remove(&mut self, category: &str) -> bool {
        self.order.retain(|c| c != category);
        self.categories.remove(category).is_some()
    }

    /// Category names in definition order.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Removes every category.
    pub fn clear(&mut self) {
        self.categories.clear();
        self.order.clear();
    }
}

impl fmt::Debug for VocabularyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VocabularyProvider")
            .field("categories", &self.order)
            .finish()
    }
}

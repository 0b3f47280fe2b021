//! Current level/phrase selection with its invariant enforced at one boundary:
//! the selected phrase is always an element of the active level's sequence.

use crate::catalog::{Level, Phrase, PhraseCatalog};

#[derive(Debug, Clone, Copy)]
pub struct SelectionState {
    level: Level,
    phrase_index: usize,
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            level: Level::Beginner,
            phrase_index: 0,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase_index
    }

    /// Switch levels and reset the phrase to the first entry of the new level.
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
        self.phrase_index = 0;
    }

    /// Select a phrase by index within the active level. Out-of-range indices
    /// are a caller bug (the view only offers in-level phrases) and are ignored.
    pub fn set_phrase(&mut self, index: usize, catalog: &PhraseCatalog) {
        if index < catalog.phrases_for(self.level).len() {
            self.phrase_index = index;
        }
    }

    pub fn phrase<'c>(&self, catalog: &'c PhraseCatalog) -> &'c Phrase {
        &catalog.phrases_for(self.level)[self.phrase_index]
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

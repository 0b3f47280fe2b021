//! Phrase catalog: difficulty levels and the phrases offered at each level.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{ensure, Result};
use serde::Deserialize;

/// Difficulty level of a practice phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn label(self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }

    fn index(self) -> usize {
        match self {
            Level::Beginner => 0,
            Level::Intermediate => 1,
            Level::Advanced => 2,
        }
    }
}

/// A practice phrase with its reference recording, relative to the assets root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub text: String,
    pub audio: PathBuf,
}

/// Ordered phrases per level. Every level maps to a non-empty sequence, so
/// lookup is total and first-entry access never fails.
#[derive(Debug, Clone)]
pub struct PhraseCatalog {
    levels: [Vec<Phrase>; 3],
}

impl PhraseCatalog {
    pub fn phrases_for(&self, level: Level) -> &[Phrase] {
        &self.levels[level.index()]
    }

    /// The built-in French catalog shipped with the app.
    pub fn default_french() -> Self {
        Self {
            levels: [
                vec![
                    phrase("Bonjour", "audio/bonjour.mp3"),
                    phrase("Merci", "audio/merci.mp3"),
                ],
                vec![
                    phrase("Comment ça va ?", "audio/comment-ca-va.mp3"),
                    phrase("Je suis étudiant", "audio/je-suis-etudiant.mp3"),
                ],
                vec![
                    phrase(
                        "J’aimerais réserver une table pour deux",
                        "audio/reserver-une-table.mp3",
                    ),
                    phrase(
                        "Il fait un temps magnifique aujourd’hui",
                        "audio/temps-magnifique.mp3",
                    ),
                ],
            ],
        }
    }
}

fn phrase(text: &str, audio: &str) -> Phrase {
    Phrase {
        text: text.to_string(),
        audio: PathBuf::from(audio),
    }
}

/// Runtime-configurable catalog parsed from JSON input.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeCatalog {
    #[serde(default)]
    pub beginner: Vec<RuntimePhrase>,
    #[serde(default)]
    pub intermediate: Vec<RuntimePhrase>,
    #[serde(default)]
    pub advanced: Vec<RuntimePhrase>,
}

/// Runtime-configurable phrase entry parsed from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimePhrase {
    pub text: String,
    #[serde(alias = "audioRef")]
    pub audio: PathBuf,
}

impl RuntimeCatalog {
    pub fn validate(&self) -> Result<()> {
        for (level, phrases) in self.entries() {
            ensure!(
                !phrases.is_empty(),
                "{} level must contain at least one phrase",
                level.label()
            );
            let mut seen = HashSet::new();
            for entry in phrases {
                ensure!(
                    !entry.text.trim().is_empty(),
                    "{} level contains a phrase with empty text",
                    level.label()
                );
                ensure!(
                    seen.insert(entry.text.as_str()),
                    "{} level lists phrase '{}' more than once",
                    level.label(),
                    entry.text
                );
            }
        }
        Ok(())
    }

    pub fn to_catalog(&self) -> PhraseCatalog {
        PhraseCatalog {
            levels: [
                convert(&self.beginner),
                convert(&self.intermediate),
                convert(&self.advanced),
            ],
        }
    }

    fn entries(&self) -> [(Level, &[RuntimePhrase]); 3] {
        [
            (Level::Beginner, self.beginner.as_slice()),
            (Level::Intermediate, self.intermediate.as_slice()),
            (Level::Advanced, self.advanced.as_slice()),
        ]
    }
}

fn convert(entries: &[RuntimePhrase]) -> Vec<Phrase> {
    entries
        .iter()
        .map(|entry| Phrase {
            text: entry.text.clone(),
            audio: entry.audio.clone(),
        })
        .collect()
}

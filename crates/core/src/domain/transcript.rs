use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Human,
    Bot,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Human => "HUMAN",
            Self::Bot => "BOT",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Record of one finished call, in utterance order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new(entries: Vec<TranscriptEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `SPEAKER: text` line per utterance.
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}: {}", entry.speaker, entry.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<TranscriptEntry> for Transcript {
    fn from_iter<I: IntoIterator<Item = TranscriptEntry>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

use intake_core::domain::transcript::Speaker;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationLine {
    pub speaker: Speaker,
    pub text: String,
}

/// Append-only turn history owned by a single agent instance.
#[derive(Clone, Debug, Default)]
pub struct ConversationLog {
    lines: Vec<ConversationLine>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.lines.push(ConversationLine { speaker, text: text.into() });
    }

    pub fn entries(&self) -> &[ConversationLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

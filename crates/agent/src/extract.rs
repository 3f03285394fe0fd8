use intake_core::domain::fields::ExtractedFields;
use intake_core::prompts;
use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{ChatMessage, CompletionClient, CompletionError};
use crate::parse::parse_completion;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("transcript extraction failed: {0}")]
    Completion(#[from] CompletionError),
}

/// Turns a finished call transcript into the fields needed for a confirmation.
#[derive(Clone, Debug)]
pub struct TranscriptExtractor<C> {
    client: C,
}

impl<C> TranscriptExtractor<C>
where
    C: CompletionClient,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn extract(&self, transcript: &str) -> Result<ExtractedFields, ExtractionError> {
        let prompt = prompts::extraction_prompt(transcript);
        let content = self.client.complete(&[ChatMessage::user(prompt)]).await.map_err(|error| {
            warn!(event_name = "extraction.completion.failed", error = %error, "extraction failed");
            ExtractionError::from(error)
        })?;

        let fields = parse_completion(&content);
        debug!(
            event_name = "extraction.completed",
            missing = ?fields.missing(),
            "parsed extraction response"
        );
        Ok(fields)
    }
}

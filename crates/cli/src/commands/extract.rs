use std::fs;
use std::path::Path;
use std::sync::Arc;

use intake_agent::extract::TranscriptExtractor;
use intake_agent::llm::{CompletionClient, OpenAiChatClient};
use intake_core::config::{AppConfig, LoadOptions};
use intake_core::domain::transcript::Transcript;

use crate::commands::CommandResult;

const COMMAND: &str = "extract";

pub fn run(path: &Path) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return CommandResult::failure(COMMAND, "config_validation", error.to_string(), 2),
    };

    let transcript = match read_transcript(path) {
        Ok(transcript) => transcript,
        Err(message) => return CommandResult::failure(COMMAND, "input", message, 1),
    };

    let client: Arc<dyn CompletionClient> = match OpenAiChatClient::from_config(&config.llm) {
        Ok(client) => Arc::new(client),
        Err(error) => return CommandResult::failure(COMMAND, "completion_client", error.to_string(), 1),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    let extractor = TranscriptExtractor::new(client);
    let fields = match runtime.block_on(extractor.extract(&transcript)) {
        Ok(fields) => fields,
        Err(error) => return CommandResult::failure(COMMAND, "extraction", error.to_string(), 1),
    };

    let message = if fields.is_complete() {
        "all fields extracted; a confirmation would be sent".to_string()
    } else {
        format!("missing information: {}; no confirmation would be sent", fields.missing().join(", "))
    };
    let data = serde_json::to_value(&fields).ok();

    CommandResult::success(COMMAND, message, data)
}

/// A JSON array of `{speaker, text}` entries is rendered the same way the
/// server renders finished calls; anything else is used as-is.
fn read_transcript(path: &Path) -> Result<String, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read transcript `{}`: {error}", path.display()))?;

    if raw.trim_start().starts_with('[') {
        if let Ok(transcript) = serde_json::from_str::<Transcript>(&raw) {
            return Ok(transcript.to_text());
        }
    }

    if raw.trim().is_empty() {
        return Err(format!("transcript `{}` is empty", path.display()));
    }

    Ok(raw)
}

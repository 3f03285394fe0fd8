use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use intake_core::config::LlmConfig;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("completion api returned status {0}")]
    Status(u16),
    #[error("completion api returned no choices")]
    NoChoices,
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion response could not be decoded: {0}")]
    Decode(String),
}

/// Chat-completion backend. Returns the content of the first choice.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

#[async_trait]
impl<T> CompletionClient for Arc<T>
where
    T: CompletionClient + ?Sized,
{
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        (**self).complete(messages).await
    }
}

/// OpenAI-compatible `/chat/completions` client. One attempt per call.
#[derive(Clone)]
pub struct OpenAiChatClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| CompletionError::Transport(error.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, CompletionError> {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl std::fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionClient for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest { model: &self.model, messages };

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    CompletionError::Transport(format!("request timed out: {error}"))
                } else {
                    CompletionError::Transport(error.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(
                event_name = "llm.completion.rejected",
                status = status.as_u16(),
                model = %self.model,
                "completion api returned non-success status"
            );
            return Err(CompletionError::Status(status.as_u16()));
        }

        let body: ChatCompletionResponse =
            response.json().await.map_err(|error| CompletionError::Decode(error.to_string()))?;

        let first = body.choices.into_iter().next().ok_or(CompletionError::NoChoices)?;
        Ok(first.message.content.unwrap_or_default())
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use intake_core::domain::agent_config::{
    ChatGptAgentConfig, SpellerAgentConfig, CHAT_GPT_AGENT_TYPE, SPELLER_AGENT_TYPE,
};
use intake_core::domain::transcript::Speaker;
use thiserror::Error;
use tracing::debug;

use crate::conversation::ConversationLog;
use crate::llm::{ChatMessage, CompletionClient, CompletionError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentReply {
    pub text: Option<String>,
    pub should_stop: bool,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("agent could not produce a reply: {0}")]
    Completion(#[from] CompletionError),
}

/// One conversational strategy, driven once per caller utterance.
#[async_trait]
pub trait RespondAgent: Send {
    fn agent_type(&self) -> &'static str;

    fn initial_message(&self) -> Option<&str>;

    async fn respond(
        &mut self,
        human_input: &str,
        conversation_id: &str,
        is_interrupt: bool,
    ) -> Result<AgentReply, AgentError>;
}

/// Replies with the caller's words spelled out, one space after every character.
#[derive(Clone, Debug, Default)]
pub struct SpellerAgent {
    config: SpellerAgentConfig,
    log: ConversationLog,
}

impl SpellerAgent {
    pub fn new(config: SpellerAgentConfig) -> Self {
        Self { config, log: ConversationLog::new() }
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.log
    }
}

pub fn spell_out(input: &str) -> String {
    let mut spelled = String::with_capacity(input.len() * 2);
    for ch in input.chars() {
        spelled.push(ch);
        spelled.push(' ');
    }
    spelled
}

#[async_trait]
impl RespondAgent for SpellerAgent {
    fn agent_type(&self) -> &'static str {
        SPELLER_AGENT_TYPE
    }

    fn initial_message(&self) -> Option<&str> {
        self.config.initial_message.as_deref()
    }

    async fn respond(
        &mut self,
        human_input: &str,
        conversation_id: &str,
        is_interrupt: bool,
    ) -> Result<AgentReply, AgentError> {
        debug!(conversation_id, is_interrupt, "Human: {human_input}");
        self.log.record(Speaker::Human, human_input);

        let response = spell_out(human_input);
        debug!(conversation_id, "Agent: {response}");
        self.log.record(Speaker::Bot, response.clone());

        Ok(AgentReply { text: Some(response), should_stop: false })
    }
}

/// Language-model agent that carries the whole call history into every turn.
pub struct ChatGptAgent {
    config: ChatGptAgentConfig,
    client: Arc<dyn CompletionClient>,
    history: Vec<ChatMessage>,
}

impl ChatGptAgent {
    pub fn new(config: ChatGptAgentConfig, client: Arc<dyn CompletionClient>) -> Self {
        let mut history = vec![ChatMessage::system(config.prompt_preamble.clone())];
        if let Some(greeting) = &config.initial_message {
            history.push(ChatMessage::assistant(greeting.clone()));
        }
        Self { config, client, history }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn generates_responses(&self) -> bool {
        self.config.generate_responses
    }
}

impl std::fmt::Debug for ChatGptAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatGptAgent")
            .field("config", &self.config)
            .field("turns", &self.history.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RespondAgent for ChatGptAgent {
    fn agent_type(&self) -> &'static str {
        CHAT_GPT_AGENT_TYPE
    }

    fn initial_message(&self) -> Option<&str> {
        self.config.initial_message.as_deref()
    }

    async fn respond(
        &mut self,
        human_input: &str,
        conversation_id: &str,
        is_interrupt: bool,
    ) -> Result<AgentReply, AgentError> {
        debug!(conversation_id, is_interrupt, turns = self.history.len(), "chat agent turn");
        let mut request = self.history.clone();
        request.push(ChatMessage::user(human_input));

        // History only grows by complete user/assistant pairs.
        let reply = self.client.complete(&request).await?;
        if reply.is_empty() {
            return Ok(AgentReply { text: None, should_stop: false });
        }

        request.push(ChatMessage::assistant(reply.clone()));
        self.history = request;
        Ok(AgentReply { text: Some(reply), should_stop: false })
    }
}

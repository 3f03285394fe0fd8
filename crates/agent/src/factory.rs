use std::sync::Arc;

use intake_core::domain::agent_config::AgentConfig;
use thiserror::Error;
use tracing::{error, info};

use crate::agents::{ChatGptAgent, RespondAgent, SpellerAgent};
use crate::llm::CompletionClient;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentFactoryError {
    #[error("unsupported agent config `{agent_type}`")]
    UnsupportedConfig { agent_type: String },
}

/// Builds the agent for a call from its tagged configuration.
#[derive(Clone)]
pub struct AgentFactory {
    completion: Arc<dyn CompletionClient>,
}

impl AgentFactory {
    pub fn new(completion: Arc<dyn CompletionClient>) -> Self {
        Self { completion }
    }

    pub fn create_agent(
        &self,
        config: &AgentConfig,
    ) -> Result<Box<dyn RespondAgent>, AgentFactoryError> {
        let agent: Box<dyn RespondAgent> = match config {
            AgentConfig::ChatGpt(chat) => {
                Box::new(ChatGptAgent::new(chat.clone(), Arc::clone(&self.completion)))
            }
            AgentConfig::Speller(speller) => Box::new(SpellerAgent::new(speller.clone())),
            AgentConfig::Unsupported { agent_type } => {
                error!(
                    event_name = "agent.factory.unsupported",
                    agent_type = %agent_type,
                    "refusing to build agent for unknown config"
                );
                return Err(AgentFactoryError::UnsupportedConfig { agent_type: agent_type.clone() });
            }
        };

        info!(event_name = "agent.factory.created", agent_type = agent.agent_type(), "agent created");
        Ok(agent)
    }
}

impl std::fmt::Debug for AgentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentFactory").finish_non_exhaustive()
    }
}

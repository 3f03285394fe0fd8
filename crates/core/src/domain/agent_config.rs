use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const CHAT_GPT_AGENT_TYPE: &str = "agent_chat_gpt";
pub const SPELLER_AGENT_TYPE: &str = "agent_speller";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatGptAgentConfig {
    #[serde(default)]
    pub initial_message: Option<String>,
    pub prompt_preamble: String,
    #[serde(default)]
    pub generate_responses: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SpellerAgentConfig {
    #[serde(default)]
    pub initial_message: Option<String>,
}

/// Agent selection for one call, tagged by `type` on the wire.
///
/// Tags this crate does not know are preserved as `Unsupported` so the
/// agent factory can reject them where the call is set up.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum AgentConfig {
    ChatGpt(ChatGptAgentConfig),
    Speller(SpellerAgentConfig),
    Unsupported { agent_type: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentConfigError {
    #[error("agent config is missing the `type` tag")]
    MissingType,
    #[error("invalid `{agent_type}` agent config: {message}")]
    Invalid { agent_type: String, message: String },
}

impl AgentConfig {
    pub fn agent_type(&self) -> &str {
        match self {
            Self::ChatGpt(_) => CHAT_GPT_AGENT_TYPE,
            Self::Speller(_) => SPELLER_AGENT_TYPE,
            Self::Unsupported { agent_type } => agent_type,
        }
    }
}

impl TryFrom<Value> for AgentConfig {
    type Error = AgentConfigError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let agent_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(AgentConfigError::MissingType)?
            .to_owned();

        let invalid = |error: serde_json::Error| AgentConfigError::Invalid {
            agent_type: agent_type.clone(),
            message: error.to_string(),
        };

        match agent_type.as_str() {
            CHAT_GPT_AGENT_TYPE => serde_json::from_value(value).map(Self::ChatGpt).map_err(invalid),
            SPELLER_AGENT_TYPE => serde_json::from_value(value).map(Self::Speller).map_err(invalid),
            _ => Ok(Self::Unsupported { agent_type }),
        }
    }
}

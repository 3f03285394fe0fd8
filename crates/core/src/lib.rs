pub mod config;
pub mod domain;
pub mod errors;
pub mod prompts;

pub use config::{AgentKind, AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::agent_config::{
    AgentConfig, AgentConfigError, ChatGptAgentConfig, SpellerAgentConfig,
};
pub use domain::fields::{ConfirmationFields, ExtractedFields};
pub use domain::transcript::{Speaker, Transcript, TranscriptEntry};
pub use errors::{ApplicationError, InterfaceError};

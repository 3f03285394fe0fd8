//! Language-model side of the intake call.
//!
//! - `llm`: chat-completion client seam and the OpenAI-compatible HTTP client
//! - `parse` / `extract`: transcript to `Email` / `Name` / `Info` fields
//! - `agents` / `factory`: per-turn responders selected from an `AgentConfig`
//!
//! The completion model only ever produces text. Whether a confirmation is
//! sent is decided by the caller from the parsed fields.

pub mod agents;
pub mod conversation;
pub mod extract;
pub mod factory;
pub mod llm;
pub mod parse;

pub use agents::{AgentError, AgentReply, ChatGptAgent, RespondAgent, SpellerAgent};
pub use conversation::{ConversationLine, ConversationLog};
pub use extract::{ExtractionError, TranscriptExtractor};
pub use factory::{AgentFactory, AgentFactoryError};
pub use llm::{ChatMessage, ChatRole, CompletionClient, CompletionError, OpenAiChatClient};
pub use parse::parse_completion;

pub mod agent_config;
pub mod fields;
pub mod transcript;

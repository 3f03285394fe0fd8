use std::sync::Arc;

use intake_agent::factory::AgentFactory;
use intake_agent::llm::{CompletionClient, CompletionError, OpenAiChatClient};
use intake_core::config::{AppConfig, ConfigError, LoadOptions};
use intake_notify::{CourierNotifier, Notifier, NotifyError};
use thiserror::Error;
use tracing::info;

use crate::app::AppState;
use crate::calls::CallSessions;
use crate::events::{EventTasks, EventsManager};

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("completion client setup failed: {0}")]
    Completion(#[source] CompletionError),
    #[error("notification client setup failed: {0}")]
    Notify(#[source] NotifyError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let completion: Arc<dyn CompletionClient> =
        Arc::new(OpenAiChatClient::from_config(&config.llm).map_err(BootstrapError::Completion)?);
    info!(
        event_name = "system.bootstrap.completion_client",
        correlation_id = "bootstrap",
        model = %config.llm.model,
        "completion client configured"
    );

    let notifier: Arc<dyn Notifier> =
        Arc::new(CourierNotifier::from_config(&config.notify).map_err(BootstrapError::Notify)?);

    let agent_config = config.agent_config();
    info!(
        event_name = "system.bootstrap.agent",
        correlation_id = "bootstrap",
        agent_type = agent_config.agent_type(),
        "inbound calls will use configured agent"
    );

    let state = AppState {
        factory: AgentFactory::new(Arc::clone(&completion)),
        agent_config,
        sessions: CallSessions::new(),
        events: Arc::new(EventsManager::new(completion, notifier)),
        event_tasks: EventTasks::default(),
    };

    Ok(Application { config, state })
}

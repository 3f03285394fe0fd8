use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use intake_agent::factory::AgentFactory;
use intake_core::domain::agent_config::AgentConfig;

use crate::calls::{receive_event, start_call, take_turn, CallSessions};
use crate::events::{EventTasks, EventsManager};
use crate::health::health;

#[derive(Clone)]
pub struct AppState {
    pub factory: AgentFactory,
    pub agent_config: AgentConfig,
    pub sessions: CallSessions,
    pub events: Arc<EventsManager>,
    pub event_tasks: EventTasks,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/calls/{conversation_id}", post(start_call))
        .route("/calls/{conversation_id}/turns", post(take_turn))
        .route("/events", post(receive_event))
        .route("/health", get(health))
        .with_state(state)
}

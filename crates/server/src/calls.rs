use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use intake_agent::agents::RespondAgent;
use intake_core::errors::{ApplicationError, InterfaceError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::events::{CallEvent, EventContext};

pub type SharedAgent = Arc<Mutex<Box<dyn RespondAgent>>>;

/// Live agents, one per active conversation.
#[derive(Clone, Default)]
pub struct CallSessions {
    inner: Arc<Mutex<HashMap<String, SharedAgent>>>,
}

impl CallSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(
        &self,
        conversation_id: &str,
        agent: Box<dyn RespondAgent>,
    ) -> Result<SharedAgent, ApplicationError> {
        let mut sessions = self.inner.lock().await;
        if sessions.contains_key(conversation_id) {
            return Err(ApplicationError::CallAlreadyActive(conversation_id.to_owned()));
        }
        let shared = Arc::new(Mutex::new(agent));
        sessions.insert(conversation_id.to_owned(), Arc::clone(&shared));
        Ok(shared)
    }

    pub async fn get(&self, conversation_id: &str) -> Result<SharedAgent, ApplicationError> {
        self.inner
            .lock()
            .await
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| ApplicationError::UnknownCall(conversation_id.to_owned()))
    }

    pub async fn end(&self, conversation_id: &str) -> bool {
        self.inner.lock().await.remove(conversation_id).is_some()
    }

    pub async fn active(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    error: &'static str,
    message: &'static str,
    correlation_id: String,
    #[serde(skip)]
    status: StatusCode,
}

impl From<InterfaceError> for ApiError {
    fn from(value: InterfaceError) -> Self {
        let (status, error) = match &value {
            InterfaceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            InterfaceError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            InterfaceError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        Self {
            error,
            message: value.user_message(),
            correlation_id: value.correlation_id().to_owned(),
            status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

fn reject(error: ApplicationError, correlation_id: &str) -> ApiError {
    warn!(
        event_name = "http.request.rejected",
        correlation_id = %correlation_id,
        error = %error,
        "request rejected"
    );
    ApiError::from(error.into_interface(correlation_id))
}

#[derive(Debug, Serialize)]
pub struct CallStarted {
    pub conversation_id: String,
    pub agent_type: &'static str,
    pub initial_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub text: String,
    #[serde(default)]
    pub is_interrupt: bool,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub response: Option<String>,
    pub should_stop: bool,
}

#[derive(Debug, Serialize)]
pub struct EventAccepted {
    pub accepted: bool,
    pub correlation_id: String,
}

pub async fn start_call(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<(StatusCode, Json<CallStarted>), ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    let agent = state
        .factory
        .create_agent(&state.agent_config)
        .map_err(|error| reject(ApplicationError::Configuration(error.to_string()), &correlation_id))?;
    let agent_type = agent.agent_type();
    let initial_message = agent.initial_message().map(str::to_owned);

    state
        .sessions
        .insert(&conversation_id, agent)
        .await
        .map_err(|error| reject(error, &correlation_id))?;

    info!(
        event_name = "call.session.started",
        correlation_id = %correlation_id,
        conversation_id = %conversation_id,
        agent_type,
        "call session started"
    );

    Ok((StatusCode::CREATED, Json(CallStarted { conversation_id, agent_type, initial_message })))
}

pub async fn take_turn(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(turn): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();

    let agent = state
        .sessions
        .get(&conversation_id)
        .await
        .map_err(|error| reject(error, &correlation_id))?;

    let reply = agent
        .lock()
        .await
        .respond(&turn.text, &conversation_id, turn.is_interrupt)
        .await
        .map_err(|error| reject(ApplicationError::Integration(error.to_string()), &correlation_id))?;

    Ok(Json(TurnResponse { response: reply.text, should_stop: reply.should_stop }))
}

pub async fn receive_event(
    State(state): State<AppState>,
    Json(event): Json<CallEvent>,
) -> (StatusCode, Json<EventAccepted>) {
    let correlation_id = Uuid::new_v4().to_string();

    if let Some(conversation_id) = event.conversation_id() {
        if state.sessions.end(conversation_id).await {
            info!(
                event_name = "call.session.ended",
                correlation_id = %correlation_id,
                conversation_id = %conversation_id,
                "call session ended"
            );
        }
    }

    let ctx = EventContext { correlation_id: correlation_id.clone() };
    state.event_tasks.spawn(Arc::clone(&state.events), event, ctx).await;

    (StatusCode::ACCEPTED, Json(EventAccepted { accepted: true, correlation_id }))
}

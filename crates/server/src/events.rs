use std::sync::Arc;
use std::time::Duration;

use intake_agent::extract::TranscriptExtractor;
use intake_agent::llm::CompletionClient;
use intake_core::domain::transcript::Transcript;
use intake_notify::{dispatch_confirmation, Notifier};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

pub const TRANSCRIPT_COMPLETE: &str = "transcript_complete";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TranscriptCompleteEvent {
    pub conversation_id: String,
    pub transcript: Transcript,
}

/// Event posted by the telephony framework, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum CallEvent {
    TranscriptComplete(TranscriptCompleteEvent),
    Unsupported { event_type: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallEventType {
    TranscriptComplete,
    Unsupported,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CallEventError {
    #[error("call event is missing the `type` tag")]
    MissingType,
    #[error("invalid `{event_type}` event: {message}")]
    Invalid { event_type: String, message: String },
}

impl CallEvent {
    pub fn event_type(&self) -> CallEventType {
        match self {
            Self::TranscriptComplete(_) => CallEventType::TranscriptComplete,
            Self::Unsupported { .. } => CallEventType::Unsupported,
        }
    }

    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            Self::TranscriptComplete(event) => Some(&event.conversation_id),
            Self::Unsupported { .. } => None,
        }
    }
}

impl TryFrom<Value> for CallEvent {
    type Error = CallEventError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(CallEventError::MissingType)?
            .to_owned();

        match event_type.as_str() {
            TRANSCRIPT_COMPLETE => serde_json::from_value(value)
                .map(Self::TranscriptComplete)
                .map_err(|error| CallEventError::Invalid { event_type, message: error.to_string() }),
            _ => Ok(Self::Unsupported { event_type }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerOutcome {
    Dispatched,
    DispatchFailed,
    Incomplete,
    ExtractionFailed,
    Ignored,
}

/// Reacts to finished calls: extract the booking fields, then confirm them.
pub struct EventsManager {
    extractor: TranscriptExtractor<Arc<dyn CompletionClient>>,
    notifier: Arc<dyn Notifier>,
}

impl EventsManager {
    pub fn new(completion: Arc<dyn CompletionClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self { extractor: TranscriptExtractor::new(completion), notifier }
    }

    pub fn subscriptions(&self) -> &'static [CallEventType] {
        &[CallEventType::TranscriptComplete]
    }

    pub async fn handle(&self, event: &CallEvent, ctx: &EventContext) -> HandlerOutcome {
        if !self.subscriptions().contains(&event.event_type()) {
            return HandlerOutcome::Ignored;
        }
        let CallEvent::TranscriptComplete(event) = event else {
            return HandlerOutcome::Ignored;
        };

        let transcript = event.transcript.to_text();
        let fields = match self.extractor.extract(&transcript).await {
            Ok(fields) => fields,
            Err(err) => {
                error!(
                    event_name = "call.transcript.extraction_failed",
                    correlation_id = %ctx.correlation_id,
                    conversation_id = %event.conversation_id,
                    error = %err,
                    "could not extract booking details from transcript"
                );
                return HandlerOutcome::ExtractionFailed;
            }
        };

        let missing = fields.missing();
        let Some(confirmation) = fields.complete() else {
            warn!(
                event_name = "call.transcript.missing_information",
                correlation_id = %ctx.correlation_id,
                conversation_id = %event.conversation_id,
                missing = ?missing,
                "missing information, confirmation not sent"
            );
            return HandlerOutcome::Incomplete;
        };

        if !dispatch_confirmation(self.notifier.as_ref(), &confirmation).await {
            warn!(
                event_name = "call.transcript.dispatch_failed",
                correlation_id = %ctx.correlation_id,
                conversation_id = %event.conversation_id,
                "confirmation was not delivered"
            );
            return HandlerOutcome::DispatchFailed;
        }
        info!(
            event_name = "call.transcript.handled",
            correlation_id = %ctx.correlation_id,
            conversation_id = %event.conversation_id,
            "call completion handled"
        );
        HandlerOutcome::Dispatched
    }
}

/// Background event work. Each event runs in its own task so a failure or
/// panic in one call never reaches the others.
#[derive(Clone, Default)]
pub struct EventTasks {
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl EventTasks {
    pub async fn spawn(&self, manager: Arc<EventsManager>, event: CallEvent, ctx: EventContext) {
        let mut tasks = self.tasks.lock().await;
        while let Some(finished) = tasks.try_join_next() {
            log_join_failure(finished);
        }

        tasks.spawn(async move {
            let outcome = manager.handle(&event, &ctx).await;
            info!(
                event_name = "call.event.finished",
                correlation_id = %ctx.correlation_id,
                outcome = ?outcome,
                "call event processed"
            );
        });
    }

    pub async fn in_flight(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// Waits for running events, giving up after `timeout`.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let mut tasks = std::mem::take(&mut *self.tasks.lock().await);
        let drained = tokio::time::timeout(timeout, async {
            while let Some(finished) = tasks.join_next().await {
                log_join_failure(finished);
            }
        })
        .await
        .is_ok();

        if !drained {
            warn!(
                event_name = "system.events.drain_timeout",
                correlation_id = "shutdown",
                abandoned = tasks.len(),
                "call events still running at shutdown"
            );
        }
        drained
    }
}

fn log_join_failure(result: Result<(), tokio::task::JoinError>) {
    if let Err(join_error) = result {
        error!(
            event_name = "call.event.panicked",
            error = %join_error,
            "call event task terminated abnormally"
        );
    }
}

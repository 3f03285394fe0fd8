use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::app::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub calls: HealthCheck,
    pub events: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let active = state.sessions.active().await;
    let in_flight = state.event_tasks.in_flight().await;

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: format!("intake-server accepting {} calls", state.agent_config.agent_type()),
        },
        calls: HealthCheck { status: "ready", detail: format!("{active} active call(s)") },
        events: HealthCheck { status: "ready", detail: format!("{in_flight} event task(s) tracked") },
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}

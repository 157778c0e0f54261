use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::metrics::UPSTREAM_LATENCY;
use crate::models::ChatRequest;
use crate::state::AppState;

/// Relay an admitted chat message to the reply backend and hand its JSON back.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(payload) = payload.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    if payload.message.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("message must not be empty".to_string()));
    }

    let start_time = Instant::now();
    let response = state
        .client
        .post(format!("{}/chat", state.chat_backend))
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::UpstreamStatus(status.as_u16()));
    }
    let body = response.json::<serde_json::Value>().await?;

    let elapsed = start_time.elapsed();
    UPSTREAM_LATENCY.observe(elapsed.as_secs_f64());
    debug!(user = %payload.user_id, elapsed_ms = elapsed.as_millis() as u64, "Chat reply relayed");

    Ok(Json(body))
}

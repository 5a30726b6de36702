//! # routes::webhook
//!
//! The two-route HTTP surface: a liveness line and the signal webhook.
//!
//! The webhook always answers HTTP 200 with `{status, message}` — error
//! signaling lives purely in the payload. That is a compatibility contract
//! with the upstream alert sender, which treats any non-200 as a delivery
//! failure and retries; do not "fix" it into status codes.

use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use crate::broker::Brokerage;
use crate::models::RawSignal;
use crate::state::AppState;

// ─── GET / ────────────────────────────────────────────────────────────────────

pub async fn root() -> &'static str {
    "Trading bridge online"
}

// ─── POST /webhook ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub message: String,
}

impl WebhookAck {
    fn success(message: String) -> Self {
        Self { status: "success", message }
    }

    fn error(message: String) -> Self {
        Self { status: "error", message }
    }
}

pub async fn webhook<B: Brokerage>(
    State(state): State<AppState<B>>,
    Json(raw): Json<RawSignal>,
) -> Json<WebhookAck> {
    let total = state.signal_count.fetch_add(1, Ordering::Relaxed) + 1;
    info!(action = %raw.action, symbol = %raw.symbol, total_signals = total, "signal received");

    match state.signals.handle(&raw).await {
        Ok(accepted) => {
            info!(
                symbol        = %accepted.symbol,
                orders_placed = accepted.orders_placed,
                monitored     = accepted.monitored,
                "signal processed"
            );
            Json(WebhookAck::success(format!("Signal processed for {}", accepted.symbol)))
        }
        Err(e) => {
            warn!(error = %e, "signal rejected");
            Json(WebhookAck::error(e.to_string()))
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_serializes_to_upstream_contract() {
        let ack = WebhookAck::success("Signal processed for AAPL".to_string());
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Signal processed for AAPL");

        let ack = WebhookAck::error("Invalid signal: missing action or symbol".to_string());
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["status"], "error");
    }
}

//! # broker::gateway
//!
//! **GatewayClient** — production [`Brokerage`] implementation speaking
//! JSON over HTTP to the broker-gateway bridge.
//!
//! ## Bridge API contract
//! ```text
//! POST /session/connect   {host, port, client_id}      -> {ok, message?}
//! GET  /session/status                                 -> {connected}
//! GET  /positions                                      -> [{symbol, sec_type, quantity}]
//! POST /order/send        OrderTicket                  -> {ok, order_id?, code?, message?}
//! POST /order/cancel      {order_id}                   -> {ok, message?}
//! GET  /order/{id}/status                              -> {status}
//! GET  /quote/{symbol}                                 -> {bid, ask}
//! GET  /events?timeout=30                              -> [BrokerEvent]   (long poll)
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::broker::{
    BrokerError, BrokerEvent, Brokerage, EventSubscription, PositionReport, Quote,
};
use crate::models::{OrderStatus, OrderTicket};

/// Cap on every request/response cycle except the event long poll.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Server-side long-poll window for /events.
const EVENT_POLL_SECS: u64 = 30;
/// Pause before retrying the event poll after a transport error.
const EVENT_RETRY_DELAY: Duration = Duration::from_secs(5);

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ConnectRequest<'a> {
    host: &'a str,
    port: u16,
    client_id: u32,
}

#[derive(Debug, Deserialize)]
struct Ack {
    ok: bool,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SessionStatus {
    connected: bool,
}

#[derive(Debug, Deserialize)]
struct OrderAck {
    ok: bool,
    order_id: Option<u64>,
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct CancelRequest {
    order_id: u64,
}

#[derive(Debug, Deserialize)]
struct OrderStatusBody {
    status: OrderStatus,
}

// ─── GatewayClient ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    http: reqwest::Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BrokerError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| BrokerError::Unreachable(e.to_string()))?;
        Self::parse_response(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BrokerError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| BrokerError::Unreachable(e.to_string()))?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BrokerError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(http_status = %status, body = %body, "gateway returned HTTP error");
            return Err(BrokerError::Http { status: status.as_u16(), body });
        }
        response
            .json()
            .await
            .map_err(|e| BrokerError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Brokerage for GatewayClient {
    async fn connect(&self, host: &str, port: u16, client_id: u32) -> Result<(), BrokerError> {
        let ack: Ack = self
            .post_json("/session/connect", &ConnectRequest { host, port, client_id })
            .await?;
        if !ack.ok {
            return Err(BrokerError::ConnectRefused(
                ack.message.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        // Unreachable bridge counts as disconnected; the reconnect loop
        // will keep retrying either way.
        match self.get_json::<SessionStatus>("/session/status").await {
            Ok(status) => status.connected,
            Err(e) => {
                warn!(error = %e, "session status check failed");
                false
            }
        }
    }

    async fn positions(&self) -> Result<Vec<PositionReport>, BrokerError> {
        self.get_json("/positions").await
    }

    async fn place_order(&self, ticket: &OrderTicket) -> Result<u64, BrokerError> {
        info!(
            symbol      = %ticket.contract.symbol,
            action      = %ticket.action,
            quantity    = ticket.quantity,
            order_type  = ?ticket.order_type,
            limit_price = ?ticket.limit_price,
            outside_rth = ticket.outside_rth,
            "sending order to gateway"
        );

        let ack: OrderAck = self.post_json("/order/send", ticket).await?;
        match (ack.ok, ack.order_id) {
            (true, Some(order_id)) => {
                info!(order_id, symbol = %ticket.contract.symbol, "gateway accepted order");
                Ok(order_id)
            }
            _ => {
                let code = ack.code.unwrap_or(0);
                let message = ack.message.unwrap_or_else(|| "unknown".to_string());
                warn!(code, %message, symbol = %ticket.contract.symbol, "gateway rejected order");
                Err(BrokerError::Rejected { code, message })
            }
        }
    }

    async fn cancel_order(&self, order_id: u64) -> Result<(), BrokerError> {
        let ack: Ack = self.post_json("/order/cancel", &CancelRequest { order_id }).await?;
        if !ack.ok {
            return Err(BrokerError::Rejected {
                code: 0,
                message: ack.message.unwrap_or_else(|| "cancel refused".to_string()),
            });
        }
        info!(order_id, "order cancel submitted");
        Ok(())
    }

    async fn order_status(&self, order_id: u64) -> Result<OrderStatus, BrokerError> {
        let body: OrderStatusBody = self.get_json(&format!("/order/{order_id}/status")).await?;
        Ok(body.status)
    }

    async fn quote(&self, symbol: &str) -> Result<Quote, BrokerError> {
        self.get_json(&format!("/quote/{symbol}")).await
    }

    async fn subscribe_events(&self) -> EventSubscription {
        let (tx, rx) = mpsc::channel(64);
        let client = self.clone();

        let poller = tokio::spawn(async move {
            let url = format!("{}/events?timeout={EVENT_POLL_SECS}", client.base_url);
            loop {
                let batch = client
                    .http
                    .get(&url)
                    .timeout(Duration::from_secs(EVENT_POLL_SECS + 10))
                    .send()
                    .await
                    .map_err(|e| BrokerError::Unreachable(e.to_string()));

                let events: Vec<BrokerEvent> = match batch {
                    Ok(response) => match GatewayClient::parse_response(response).await {
                        Ok(events) => events,
                        Err(e) => {
                            warn!(error = %e, "event poll parse failed");
                            tokio::time::sleep(EVENT_RETRY_DELAY).await;
                            continue;
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "event poll failed");
                        tokio::time::sleep(EVENT_RETRY_DELAY).await;
                        continue;
                    }
                };

                for event in events {
                    // Receiver gone means the subscription was replaced.
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
        });

        EventSubscription { events: rx, poller: Some(poller) }
    }
}

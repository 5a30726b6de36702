//! # broker
//!
//! The brokerage collaborator: everything the relay needs from the broker
//! gateway, behind one async trait so the engine can be exercised against
//! a recording mock. The production implementation ([`gateway::GatewayClient`])
//! speaks JSON over HTTP to a bridge process that owns the actual broker
//! session — the relay never implements order books or market data itself.

pub mod gateway;
#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::{Action, OrderStatus, OrderTicket};

// ─── BrokerError ──────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BrokerError {
    /// Transport-level failure reaching the gateway bridge.
    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    /// The bridge answered with a non-success HTTP status.
    #[error("gateway HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The bridge answered 2xx but the body did not parse.
    #[error("gateway response parse error: {0}")]
    Parse(String),

    /// The broker refused the session connect.
    #[error("session connect refused: {0}")]
    ConnectRefused(String),

    /// The broker rejected the specific request.
    #[error("rejected by broker: code={code} {message}")]
    Rejected { code: i64, message: String },
}

// ─── Quote ────────────────────────────────────────────────────────────────────

/// Best bid/ask snapshot for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

impl Quote {
    /// Price to work an order at: buyers lift the ask, sellers hit the bid.
    /// A missing ask falls back to the bid; a non-positive result means the
    /// quote is unusable and the caller must not place the order.
    pub fn side_price(&self, action: Action) -> f64 {
        match action {
            Action::Buy if self.ask > 0.0 => self.ask,
            _ => self.bid,
        }
    }
}

// ─── PositionReport ───────────────────────────────────────────────────────────

/// One row of the broker's position snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub symbol: String,
    pub sec_type: String,
    pub quantity: i64,
}

// ─── BrokerEvent ──────────────────────────────────────────────────────────────

/// Push events from the gateway. Observability only — nothing in the relay
/// branches on these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrokerEvent {
    Error {
        req_id: i64,
        code: i64,
        message: String,
        symbol: Option<String>,
    },
    OrderStatus {
        order_id: u64,
        status: OrderStatus,
    },
}

/// A live event subscription: the receiving end plus the cancellable
/// poller task feeding it (absent for in-process implementations).
pub struct EventSubscription {
    pub events: mpsc::Receiver<BrokerEvent>,
    pub poller: Option<JoinHandle<()>>,
}

// ─── Brokerage ────────────────────────────────────────────────────────────────

/// The broker gateway interface the relay is written against.
///
/// One logical session; callers serialize their use of it per order — the
/// engine never races two calls for the same order id.
#[async_trait]
pub trait Brokerage: Send + Sync + 'static {
    async fn connect(&self, host: &str, port: u16, client_id: u32) -> Result<(), BrokerError>;

    async fn is_connected(&self) -> bool;

    /// Full position snapshot, all security types.
    async fn positions(&self) -> Result<Vec<PositionReport>, BrokerError>;

    /// Submit an order; returns the broker order id.
    async fn place_order(&self, ticket: &OrderTicket) -> Result<u64, BrokerError>;

    async fn cancel_order(&self, order_id: u64) -> Result<(), BrokerError>;

    async fn order_status(&self, order_id: u64) -> Result<OrderStatus, BrokerError>;

    /// Best bid/ask for a symbol, on demand.
    async fn quote(&self, symbol: &str) -> Result<Quote, BrokerError>;

    /// Subscribe to gateway push events. Each call yields a fresh
    /// subscription; the previous one is cancelled by dropping/aborting it.
    async fn subscribe_events(&self) -> EventSubscription;
}

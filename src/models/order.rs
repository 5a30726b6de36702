//! # models::order
//!
//! Order wire types and the working-order state carried by a monitor.
//!
//! ## Gateway wire contract
//! `OrderTicket` is posted as-is to the bridge's `/order/send`:
//! ```json
//! {
//!   "contract": { "symbol": "AAPL", "sec_type": "STK", "currency": "USD", "exchange": "SMART" },
//!   "action": "BUY", "quantity": 10, "order_type": "LMT",
//!   "limit_price": 150.25, "outside_rth": true
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Action;

// ─── Contract ─────────────────────────────────────────────────────────────────

/// Opaque tradable-instrument handle the gateway resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub symbol: String,
    pub sec_type: String,
    pub currency: String,
    pub exchange: String,
}

impl Contract {
    /// US stock with automatic routing.
    pub fn stock(ticker: &str) -> Self {
        Self {
            symbol: ticker.to_uppercase(),
            sec_type: "STK".to_string(),
            currency: "USD".to_string(),
            exchange: "SMART".to_string(),
        }
    }
}

// ─── OrderTicket ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "MKT")]
    Market,
    #[serde(rename = "LMT")]
    Limit,
}

/// Order request sent to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderTicket {
    pub contract: Contract,
    pub action: Action,
    pub quantity: i64,
    pub order_type: OrderType,
    pub limit_price: Option<f64>,
    /// Allow fills outside the regular 09:30–16:00 session.
    pub outside_rth: bool,
}

impl OrderTicket {
    pub fn market(contract: Contract, action: Action, quantity: i64, outside_rth: bool) -> Self {
        Self {
            contract,
            action,
            quantity,
            order_type: OrderType::Market,
            limit_price: None,
            outside_rth,
        }
    }

    pub fn limit(
        contract: Contract,
        action: Action,
        quantity: i64,
        limit_price: f64,
        outside_rth: bool,
    ) -> Self {
        Self {
            contract,
            action,
            quantity,
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            outside_rth,
        }
    }
}

// ─── OrderStatus ──────────────────────────────────────────────────────────────

/// Broker-side order status. Only Filled and Cancelled are terminal; the
/// gateway reports broker-initiated cancels under the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    PendingSubmit,
    PreSubmitted,
    Submitted,
    Filled,
    #[serde(alias = "ApiCancelled")]
    Cancelled,
    Inactive,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

// ─── WorkingOrder ─────────────────────────────────────────────────────────────

/// A submitted extended-hours limit order that has not reached a terminal
/// state. Owned exclusively by its monitor task; a resubmission mutates the
/// tracked order id in place (same lineage, fresh broker id).
#[derive(Debug, Clone)]
pub struct WorkingOrder {
    /// Stable id for the whole submit/resubmit chain.
    pub lineage_id: Uuid,
    /// Broker order id currently being monitored.
    pub order_id: u64,
    pub symbol: String,
    pub action: Action,
    pub quantity: i64,
    pub limit_price: f64,
    pub submitted_at: DateTime<Utc>,
}

impl WorkingOrder {
    pub fn new(order_id: u64, symbol: &str, action: Action, quantity: i64, limit_price: f64) -> Self {
        Self {
            lineage_id: Uuid::new_v4(),
            order_id,
            symbol: symbol.to_string(),
            action,
            quantity,
            limit_price,
            submitted_at: Utc::now(),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_contract_uppercases() {
        let contract = Contract::stock("aapl");
        assert_eq!(contract.symbol, "AAPL");
        assert_eq!(contract.sec_type, "STK");
        assert_eq!(contract.exchange, "SMART");
    }

    #[test]
    fn test_market_ticket_has_no_price() {
        let ticket = OrderTicket::market(Contract::stock("MSFT"), Action::Sell, 3, false);
        assert_eq!(ticket.order_type, OrderType::Market);
        assert_eq!(ticket.limit_price, None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Filled.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Submitted.is_terminal());
        assert!(!OrderStatus::PreSubmitted.is_terminal());
    }

    #[test]
    fn test_api_cancelled_maps_to_cancelled() {
        let status: OrderStatus = serde_json::from_str(r#""ApiCancelled""#).unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }
}

//! # engine::router
//!
//! **SignalRouter** — turns one validated webhook signal into broker
//! orders: refresh positions, flatten an opposite-direction position
//! first, then place the directional order (market during regular/closed
//! hours, quote-priced limit plus monitor during extended hours).
//!
//! Placement is strictly sequential within a signal: the closing order's
//! placement call completes before the directional order goes out, because
//! both target the same symbol. Nothing here panics or escapes as an HTTP
//! error — every failure becomes a rejected result for the webhook payload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::broker::Brokerage;
use crate::engine::supervisor::OrderSupervisor;
use crate::error::TradeError;
use crate::models::{Action, Contract, OrderTicket, PositionSide, RawSignal, Signal, WorkingOrder};
use crate::positions::PositionBook;
use crate::session::clock::{MarketSession, SessionClock};

/// Outcome of an accepted signal, for the webhook ack and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub symbol: String,
    pub orders_placed: u32,
    pub monitored: bool,
}

pub struct SignalRouter<B: Brokerage> {
    broker: Arc<B>,
    positions: PositionBook,
    clock: SessionClock,
    supervisor: Arc<OrderSupervisor<B>>,
    default_size: i64,
}

impl<B: Brokerage> SignalRouter<B> {
    pub fn new(
        broker: Arc<B>,
        positions: PositionBook,
        clock: SessionClock,
        supervisor: Arc<OrderSupervisor<B>>,
        default_size: i64,
    ) -> Self {
        Self { broker, positions, clock, supervisor, default_size }
    }

    pub async fn handle(&self, raw: &RawSignal) -> Result<Accepted, TradeError> {
        self.handle_at(raw, Utc::now()).await
    }

    /// Split out from [`handle`] so tests can pin the session instant.
    pub async fn handle_at(
        &self,
        raw: &RawSignal,
        now: DateTime<Utc>,
    ) -> Result<Accepted, TradeError> {
        let signal = Signal::parse(raw)?;

        self.positions.refresh(self.broker.as_ref()).await?;
        let position = self.positions.get(&signal.symbol).await;

        let quantity = match position.quantity.abs() {
            0 => self.default_size,
            held => held,
        };

        let session = self.clock.classify(now);
        let outside_rth = session != MarketSession::Regular;
        let contract = Contract::stock(&signal.symbol);
        let mut orders_placed = 0u32;

        // Flatten an opposite-direction position before opening the new
        // one. The await completes the placement; only then does the
        // directional order go out.
        let flattening = matches!(
            (signal.action, position.side()),
            (Action::Buy, PositionSide::Short) | (Action::Sell, PositionSide::Long)
        );
        if flattening {
            let closing = OrderTicket::market(contract.clone(), signal.action, quantity, outside_rth);
            let close_id = self.broker.place_order(&closing).await?;
            orders_placed += 1;
            info!(
                order_id = close_id,
                symbol   = %signal.symbol,
                action   = %signal.action,
                quantity,
                was      = ?position.side(),
                "closed opposite position"
            );
        }

        let monitored = if session.is_extended() {
            let price = self
                .broker
                .quote(&signal.symbol)
                .await
                .map(|quote| quote.side_price(signal.action))
                .unwrap_or(0.0);
            if price <= 0.0 {
                return Err(TradeError::QuoteUnavailable { symbol: signal.symbol });
            }

            let ticket = OrderTicket::limit(contract, signal.action, quantity, price, true);
            let order_id = self.broker.place_order(&ticket).await?;
            orders_placed += 1;
            info!(
                order_id,
                symbol  = %signal.symbol,
                action  = %signal.action,
                quantity,
                price,
                session = ?session,
                "placed extended-hours limit order"
            );

            self.supervisor
                .register(WorkingOrder::new(order_id, &signal.symbol, signal.action, quantity, price))
                .await;
            true
        } else {
            let ticket = OrderTicket::market(contract, signal.action, quantity, outside_rth);
            let order_id = self.broker.place_order(&ticket).await?;
            orders_placed += 1;
            info!(
                order_id,
                symbol  = %signal.symbol,
                action  = %signal.action,
                quantity,
                session = ?session,
                "placed market order"
            );
            false
        };

        Ok(Accepted { symbol: signal.symbol, orders_placed, monitored })
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

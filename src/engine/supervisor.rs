//! # engine::supervisor
//!
//! **OrderSupervisor** — the submit → monitor → resubmit/cancel state
//! machine for extended-hours limit orders.
//!
//! Each registered [`WorkingOrder`] gets one monitor task. The task wakes
//! every poll interval, checks order status, and once the order has sat
//! unfilled past the staleness threshold it re-prices: fetch a fresh quote,
//! place a new limit at that price for the same symbol/action/quantity, and
//! carry on under the new order id. The superseded id is never polled
//! again. Retries are unbounded — a working order chases the market until
//! it fills, is cancelled, or a broker/price failure ends the lineage.
//!
//! Elapsed time is measured on the tokio clock so tests can step the loop
//! with a paused runtime instead of sleeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::broker::Brokerage;
use crate::config::Config;
use crate::models::{Action, Contract, OrderStatus, OrderTicket, WorkingOrder};

// ─── MonitorConfig ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Wake-up cadence for status polls.
    pub poll_interval: Duration,
    /// Unfilled age after which the order is re-priced.
    pub stale_after: Duration,
}

impl MonitorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval,
            stale_after: config.stale_after,
        }
    }
}

// ─── MonitorOutcome ───────────────────────────────────────────────────────────

/// Terminal result of one monitor lineage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorOutcome {
    Filled,
    Cancelled,
    /// Broker call failure or a dead quote at re-price time. Logged as an
    /// error; there is no caller left to surface it to.
    Failed(String),
}

// ─── OrderSupervisor ──────────────────────────────────────────────────────────

type MonitorKey = (String, Action);

struct ActiveMonitor {
    lineage_id: Uuid,
    handle: JoinHandle<()>,
}

pub struct OrderSupervisor<B: Brokerage> {
    broker: Arc<B>,
    config: MonitorConfig,
    active: Arc<RwLock<HashMap<MonitorKey, ActiveMonitor>>>,
}

impl<B: Brokerage> OrderSupervisor<B> {
    pub fn new(broker: Arc<B>, config: MonitorConfig) -> Self {
        Self {
            broker,
            config,
            active: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start monitoring a freshly placed extended-hours limit order.
    ///
    /// At most one monitor runs per (symbol, action): registering over an
    /// existing one replaces it, never duplicates it.
    pub async fn register(&self, order: WorkingOrder) {
        let key: MonitorKey = (order.symbol.clone(), order.action);
        let lineage_id = order.lineage_id;

        info!(
            order_id = order.order_id,
            symbol   = %order.symbol,
            action   = %order.action,
            quantity = order.quantity,
            price    = order.limit_price,
            "monitoring working order"
        );

        let broker = self.broker.clone();
        let config = self.config;
        let active = self.active.clone();
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            let outcome = run_monitor(broker, config, order).await;
            debug!(symbol = %task_key.0, action = %task_key.1, outcome = ?outcome, "monitor finished");

            // Deregister, but only if this lineage still owns the slot —
            // a replacement may already have taken it.
            let mut map = active.write().await;
            if map.get(&task_key).map(|m| m.lineage_id) == Some(lineage_id) {
                map.remove(&task_key);
            }
        });

        let mut map = self.active.write().await;
        if let Some(previous) = map.insert(key.clone(), ActiveMonitor { lineage_id, handle }) {
            warn!(symbol = %key.0, action = %key.1, "replacing existing order monitor");
            previous.handle.abort();
        }
    }

    pub async fn active_count(&self) -> usize {
        self.active.read().await.len()
    }
}

// ─── Monitor loop ─────────────────────────────────────────────────────────────

pub(crate) async fn run_monitor<B: Brokerage>(
    broker: Arc<B>,
    config: MonitorConfig,
    mut order: WorkingOrder,
) -> MonitorOutcome {
    let mut submitted = Instant::now();

    loop {
        tokio::time::sleep(config.poll_interval).await;

        let status = match broker.order_status(order.order_id).await {
            Ok(status) => status,
            Err(e) => {
                error!(
                    order_id = order.order_id,
                    symbol   = %order.symbol,
                    error    = %e,
                    "order status query failed, abandoning monitor"
                );
                return MonitorOutcome::Failed(e.to_string());
            }
        };

        match status {
            OrderStatus::Filled => {
                info!(order_id = order.order_id, symbol = %order.symbol, action = %order.action, "order filled");
                return MonitorOutcome::Filled;
            }
            OrderStatus::Cancelled => {
                info!(order_id = order.order_id, symbol = %order.symbol, action = %order.action, "order cancelled");
                return MonitorOutcome::Cancelled;
            }
            _ => {}
        }

        if submitted.elapsed() <= config.stale_after {
            continue;
        }

        // Stale: re-price off a fresh quote.
        let fresh_price = match broker.quote(&order.symbol).await {
            Ok(quote) => quote.side_price(order.action),
            Err(e) => {
                warn!(symbol = %order.symbol, error = %e, "re-price quote lookup failed");
                0.0
            }
        };

        if fresh_price <= 0.0 {
            error!(
                order_id = order.order_id,
                symbol   = %order.symbol,
                "no valid price to chase, cancelling working order"
            );
            if let Err(e) = broker.cancel_order(order.order_id).await {
                error!(order_id = order.order_id, error = %e, "cancel of stale order failed");
            }
            return MonitorOutcome::Failed(format!("no valid re-price quote for {}", order.symbol));
        }

        let replacement = OrderTicket::limit(
            Contract::stock(&order.symbol),
            order.action,
            order.quantity,
            fresh_price,
            true,
        );

        match broker.place_order(&replacement).await {
            Ok(new_id) => {
                info!(
                    old_order_id = order.order_id,
                    new_order_id = new_id,
                    symbol       = %order.symbol,
                    action       = %order.action,
                    price        = fresh_price,
                    "resubmitted stale order at fresh price"
                );
                // Old id is superseded from this point; it is never polled again.
                order.order_id = new_id;
                order.limit_price = fresh_price;
                order.submitted_at = Utc::now();
                submitted = Instant::now();
            }
            Err(e) => {
                error!(
                    order_id = order.order_id,
                    symbol   = %order.symbol,
                    error    = %e,
                    "resubmission failed, abandoning monitor"
                );
                return MonitorOutcome::Failed(e.to_string());
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

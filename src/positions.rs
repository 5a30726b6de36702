//! # positions
//!
//! **PositionBook** — in-memory cache of the last known stock position per
//! symbol. Refreshed from the broker at the top of every signal, and always
//! replaced as a whole map under one write lock so readers never see a mix
//! of stale and fresh symbols.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::broker::{BrokerError, Brokerage};
use crate::models::Position;

#[derive(Clone, Default)]
pub struct PositionBook {
    inner: Arc<RwLock<HashMap<String, Position>>>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query the broker and replace the entire cached mapping. Non-stock
    /// rows are dropped — this relay only trades US stocks.
    pub async fn refresh<B: Brokerage>(&self, broker: &B) -> Result<(), BrokerError> {
        let reports = broker.positions().await?;
        let fresh: HashMap<String, Position> = reports
            .into_iter()
            .filter(|r| r.sec_type == "STK")
            .map(|r| {
                (
                    r.symbol.clone(),
                    Position { symbol: r.symbol, quantity: r.quantity },
                )
            })
            .collect();

        debug!(symbols = fresh.len(), "position book refreshed");
        *self.inner.write().await = fresh;
        Ok(())
    }

    /// Last known position, FLAT/0 for unknown symbols.
    pub async fn get(&self, symbol: &str) -> Position {
        self.inner
            .read()
            .await
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Position::flat(symbol))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

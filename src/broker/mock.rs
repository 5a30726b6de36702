//! # broker::mock
//!
//! Recording [`Brokerage`] double for engine tests: every call is logged,
//! quotes and order statuses are scripted ahead of time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::broker::{
    BrokerError, Brokerage, EventSubscription, PositionReport, Quote,
};
use crate::models::{OrderStatus, OrderTicket};

#[derive(Default)]
pub struct MockBroker {
    pub placed: Mutex<Vec<OrderTicket>>,
    pub cancelled: Mutex<Vec<u64>>,
    pub status_polls: Mutex<Vec<u64>>,
    pub connect_calls: Mutex<Vec<(String, u16, u32)>>,
    pub position_calls: AtomicU64,
    pub quote_calls: AtomicU64,

    statuses: Mutex<VecDeque<OrderStatus>>,
    quote: Mutex<Option<Quote>>,
    positions: Mutex<Vec<PositionReport>>,
    next_order_id: AtomicU64,
    connected: AtomicBool,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_quote(&self, bid: f64, ask: f64) {
        *self.quote.lock().unwrap() = Some(Quote { bid, ask });
    }

    pub fn set_positions(&self, reports: Vec<PositionReport>) {
        *self.positions.lock().unwrap() = reports;
    }

    /// Queue the statuses returned by successive `order_status` calls.
    /// When the queue runs dry the order reports Submitted forever.
    pub fn script_statuses(&self, statuses: &[OrderStatus]) {
        self.statuses.lock().unwrap().extend(statuses.iter().copied());
    }

    pub fn placed_orders(&self) -> Vec<OrderTicket> {
        self.placed.lock().unwrap().clone()
    }

    pub fn polled_ids(&self) -> Vec<u64> {
        self.status_polls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Brokerage for MockBroker {
    async fn connect(&self, host: &str, port: u16, client_id: u32) -> Result<(), BrokerError> {
        self.connect_calls
            .lock()
            .unwrap()
            .push((host.to_string(), port, client_id));
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn positions(&self) -> Result<Vec<PositionReport>, BrokerError> {
        self.position_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.positions.lock().unwrap().clone())
    }

    async fn place_order(&self, ticket: &OrderTicket) -> Result<u64, BrokerError> {
        self.placed.lock().unwrap().push(ticket.clone());
        Ok(self.next_order_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn cancel_order(&self, order_id: u64) -> Result<(), BrokerError> {
        self.cancelled.lock().unwrap().push(order_id);
        Ok(())
    }

    async fn order_status(&self, order_id: u64) -> Result<OrderStatus, BrokerError> {
        self.status_polls.lock().unwrap().push(order_id);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(OrderStatus::Submitted))
    }

    async fn quote(&self, _symbol: &str) -> Result<Quote, BrokerError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        let quote = *self.quote.lock().unwrap();
        quote.ok_or_else(|| BrokerError::Unreachable("no quote scripted".to_string()))
    }

    async fn subscribe_events(&self) -> EventSubscription {
        let (_tx, rx) = mpsc::channel(8);
        EventSubscription { events: rx, poller: None }
    }
}

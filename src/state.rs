//! # state
//!
//! Shared state injected into every axum handler. Deliberately thin: the
//! router owns the position book and supervisor; handlers only need the
//! signal router plus a received-signal counter for the logs.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::broker::Brokerage;
use crate::engine::SignalRouter;

pub struct AppState<B: Brokerage> {
    pub signals: Arc<SignalRouter<B>>,
    pub signal_count: Arc<AtomicU64>,
}

impl<B: Brokerage> AppState<B> {
    pub fn new(signals: Arc<SignalRouter<B>>) -> Self {
        Self {
            signals,
            signal_count: Arc::new(AtomicU64::new(0)),
        }
    }
}

// Manual impl: derive(Clone) would demand B: Clone, which the Arc makes
// unnecessary.
impl<B: Brokerage> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            signals: self.signals.clone(),
            signal_count: self.signal_count.clone(),
        }
    }
}

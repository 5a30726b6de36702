//! # session::manager
//!
//! **SessionManager** — owns the broker session: initial connect, periodic
//! connectivity check with reconnect, and the event subscription that gets
//! re-wired after every reconnect. Broker events are logged here and
//! nowhere else; they never drive control flow.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::broker::{BrokerError, BrokerEvent, Brokerage, EventSubscription};
use crate::config::Config;

/// The two tasks kept alive per subscription: the gateway poller (if the
/// implementation has one) and the log relay.
struct EventWiring {
    relay: JoinHandle<()>,
    poller: Option<JoinHandle<()>>,
}

impl EventWiring {
    fn abort(self) {
        self.relay.abort();
        if let Some(poller) = self.poller {
            poller.abort();
        }
    }
}

pub struct SessionManager<B: Brokerage> {
    broker: Arc<B>,
    config: Arc<Config>,
    wiring: Mutex<Option<EventWiring>>,
}

impl<B: Brokerage> SessionManager<B> {
    pub fn new(broker: Arc<B>, config: Arc<Config>) -> Self {
        Self { broker, config, wiring: Mutex::new(None) }
    }

    /// Connect and (re)subscribe to broker events. Replaces any previous
    /// subscription so a reconnect never leaves two relays running.
    pub async fn establish(&self) -> Result<(), BrokerError> {
        let port = self.config.broker_port();
        info!(
            host      = %self.config.broker_host,
            port,
            client_id = self.config.broker_client_id,
            mode      = %self.config.trading_mode,
            "connecting to broker"
        );
        self.broker
            .connect(&self.config.broker_host, port, self.config.broker_client_id)
            .await?;

        let EventSubscription { mut events, poller } = self.broker.subscribe_events().await;
        let relay = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                log_broker_event(&event);
            }
        });

        let mut guard = self.wiring.lock().await;
        if let Some(previous) = guard.take() {
            previous.abort();
        }
        *guard = Some(EventWiring { relay, poller });

        info!("broker session established");
        Ok(())
    }

    /// Connectivity watchdog: check every reconnect interval, re-establish
    /// when dropped. Failures are logged and retried next cycle.
    pub async fn run(self: Arc<Self>) {
        loop {
            tokio::time::sleep(self.config.reconnect_interval).await;
            if self.broker.is_connected().await {
                continue;
            }
            warn!("broker session lost, reconnecting");
            match self.establish().await {
                Ok(()) => info!("broker session restored"),
                Err(e) => error!(error = %e, "reconnect failed, will retry"),
            }
        }
    }
}

fn log_broker_event(event: &BrokerEvent) {
    match event {
        BrokerEvent::Error { req_id, code, message, symbol } => {
            error!(req_id, code, %message, symbol = ?symbol, "broker error event");
        }
        BrokerEvent::OrderStatus { order_id, status } => {
            info!(order_id, status = ?status, "broker order status event");
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::mock::MockBroker;
    use crate::config::{Config, TradingMode};
    use chrono::NaiveTime;
    use std::time::Duration;

    fn test_config(mode: TradingMode) -> Arc<Config> {
        Arc::new(Config {
            gateway_base_url: "http://localhost:0".to_string(),
            trading_mode: mode,
            broker_host: "127.0.0.1".to_string(),
            broker_paper_port: 7497,
            broker_live_port: 7496,
            broker_client_id: 1,
            default_position_size: 1,
            poll_interval: Duration::from_secs(60),
            stale_after: Duration::from_secs(180),
            reconnect_interval: Duration::from_secs(60),
            market_timezone: "US/Eastern".to_string(),
            pre_market_open: NaiveTime::from_hms_opt(4, 0, 0).unwrap(),
            market_open: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            market_close: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            post_market_close: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        })
    }

    #[tokio::test]
    async fn test_establish_uses_configured_paper_port() {
        let broker = Arc::new(MockBroker::new());
        let manager = SessionManager::new(broker.clone(), test_config(TradingMode::Paper));

        manager.establish().await.unwrap();

        let calls = broker.connect_calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("127.0.0.1".to_string(), 7497, 1)]);
        assert!(broker.is_connected().await);
    }

    #[tokio::test]
    async fn test_live_mode_selects_live_port() {
        let broker = Arc::new(MockBroker::new());
        let manager = SessionManager::new(broker.clone(), test_config(TradingMode::Live));

        manager.establish().await.unwrap();

        let calls = broker.connect_calls.lock().unwrap().clone();
        assert_eq!(calls[0].1, 7496);
    }

    #[tokio::test]
    async fn test_reestablish_replaces_subscription() {
        let broker = Arc::new(MockBroker::new());
        let manager = SessionManager::new(broker.clone(), test_config(TradingMode::Paper));

        manager.establish().await.unwrap();
        manager.establish().await.unwrap();

        // Two connects, and the second wiring replaced the first without
        // leaking a relay task (abort is synchronous, nothing to await).
        assert_eq!(broker.connect_calls.lock().unwrap().len(), 2);
    }
}

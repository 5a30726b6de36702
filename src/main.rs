//! # Tradegate — webhook-to-brokerage signal relay
//!
//! ```text
//!  ┌──────────────┐  POST /webhook              ┌────────────────────────────┐
//!  │ Alert sender │ ──────────────────────────▶ │ SignalRouter               │
//!  └──────────────┘  {action, symbol}           │ ├─ PositionBook (refresh)  │
//!                                               │ ├─ SessionClock            │
//!  ┌──────────────┐  HTTP bridge (reqwest)      │ └─ OrderSupervisor ──┐     │
//!  │ Broker       │ ◀────────────────────────── │                      │     │
//!  │ gateway      │  orders / quotes / events   │  monitor tasks ◀─────┘     │
//!  └──────────────┘                             └────────────────────────────┘
//!                     SessionManager: connect · 60s reconnect · event logs
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod broker;
mod config;
mod engine;
mod error;
mod models;
mod positions;
mod routes;
mod session;
mod state;

use broker::gateway::GatewayClient;
use config::Config;
use engine::{MonitorConfig, OrderSupervisor, SignalRouter};
use positions::PositionBook;
use routes::webhook::{root, webhook};
use session::{SessionClock, SessionManager};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("tradegate=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"
  ╔══════════════════════════════════════════════╗
  ║  TRADEGATE — webhook → brokerage relay       ║
  ║  Signals · Sessions · Order supervision      ║
  ╚══════════════════════════════════════════════╝"#);

    // ── 3. Config & broker session ────────────────────────────────────────────
    let config = Arc::new(Config::from_env()?);
    info!(mode = %config.trading_mode, gateway = %config.gateway_base_url, "configuration loaded");

    let broker = Arc::new(GatewayClient::new(config.gateway_base_url.clone()));
    let session = Arc::new(SessionManager::new(broker.clone(), config.clone()));
    if let Err(e) = session.establish().await {
        // Not fatal: the watchdog keeps retrying while signals get
        // rejected with broker errors.
        warn!(error = %e, "initial broker connect failed, reconnect loop will retry");
    }
    tokio::spawn(session.run());

    // ── 4. Engine ─────────────────────────────────────────────────────────────
    let supervisor = Arc::new(OrderSupervisor::new(
        broker.clone(),
        MonitorConfig::from_config(&config),
    ));
    let signals = Arc::new(SignalRouter::new(
        broker,
        PositionBook::new(),
        SessionClock::from_config(&config),
        supervisor,
        config.default_position_size,
    ));
    let state = AppState::new(signals);

    // ── 5. Router ─────────────────────────────────────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/webhook", post(webhook::<GatewayClient>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // ── 6. Bind & Serve ───────────────────────────────────────────────────────
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
        .parse()?;

    info!(?addr, "tradegate server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

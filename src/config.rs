//! # config — environment-driven configuration
//!
//! Everything the relay can be tuned with lives here, read once at startup.
//! Paper vs live is an explicit choice, never a hardcoded port.

use std::time::Duration;

use anyhow::{bail, Context};
use chrono::NaiveTime;

// ─── Trading Mode ─────────────────────────────────────────────────────────────

/// Which gateway session the relay connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradingMode {
    Paper,
    Live,
}

impl std::fmt::Display for TradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradingMode::Paper => write!(f, "paper"),
            TradingMode::Live => write!(f, "live"),
        }
    }
}

// ─── Config ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the HTTP broker-gateway bridge.
    pub gateway_base_url: String,
    /// Paper or live session (selects the broker port).
    pub trading_mode: TradingMode,
    pub broker_host: String,
    pub broker_paper_port: u16,
    pub broker_live_port: u16,
    pub broker_client_id: u32,
    /// Share quantity used when the account is flat in the signaled symbol.
    pub default_position_size: i64,
    /// How often a working-order monitor polls order status.
    pub poll_interval: Duration,
    /// Age after which an unfilled extended-hours limit order is re-priced.
    pub stale_after: Duration,
    /// How often the session manager checks broker connectivity.
    pub reconnect_interval: Duration,
    /// IANA zone name of the exchange, e.g. "US/Eastern".
    pub market_timezone: String,
    // ── Session boundaries, local exchange time ──────────────────────────────
    pub pre_market_open: NaiveTime,
    pub market_open: NaiveTime,
    pub market_close: NaiveTime,
    pub post_market_close: NaiveTime,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let mode_str = env_str("TRADING_MODE", "paper").to_lowercase();
        let trading_mode = match mode_str.as_str() {
            "paper" => TradingMode::Paper,
            "live" => TradingMode::Live,
            other => bail!("Unknown TRADING_MODE: '{other}'. Use 'paper' or 'live'"),
        };

        Ok(Self {
            gateway_base_url: env_str("GATEWAY_BASE_URL", "http://localhost:8080"),
            trading_mode,
            broker_host: env_str("BROKER_HOST", "127.0.0.1"),
            broker_paper_port: env_u16("BROKER_PAPER_PORT", 7497)?,
            broker_live_port: env_u16("BROKER_LIVE_PORT", 7496)?,
            broker_client_id: env_str("BROKER_CLIENT_ID", "1")
                .parse()
                .context("BROKER_CLIENT_ID must be a number")?,
            default_position_size: env_str("DEFAULT_POSITION_SIZE", "1")
                .parse()
                .context("DEFAULT_POSITION_SIZE must be a whole number of shares")?,
            poll_interval: Duration::from_secs(env_u64("POLL_INTERVAL_SECS", 60)),
            stale_after: Duration::from_secs(env_u64("STALE_AFTER_SECS", 180)),
            reconnect_interval: Duration::from_secs(env_u64("RECONNECT_INTERVAL_SECS", 60)),
            market_timezone: env_str("MARKET_TIMEZONE", "US/Eastern"),
            pre_market_open: env_time("PRE_MARKET_OPEN", "04:00")?,
            market_open: env_time("MARKET_OPEN", "09:30")?,
            market_close: env_time("MARKET_CLOSE", "16:00")?,
            post_market_close: env_time("POST_MARKET_CLOSE", "20:00")?,
        })
    }

    /// Broker port for the configured trading mode.
    pub fn broker_port(&self) -> u16 {
        match self.trading_mode {
            TradingMode::Paper => self.broker_paper_port,
            TradingMode::Live => self.broker_live_port,
        }
    }
}

// ─── Env Helpers ──────────────────────────────────────────────────────────────

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u16(key: &str, default: u16) -> anyhow::Result<u16> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{key} must be a port number")),
        Err(_) => Ok(default),
    }
}

fn env_time(key: &str, default: &str) -> anyhow::Result<NaiveTime> {
    let raw = env_str(key, default);
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .with_context(|| format!("{key} must be HH:MM local exchange time (got '{raw}')"))
}

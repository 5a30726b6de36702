//! # session::clock
//!
//! **SessionClock** — classifies an instant into the exchange's trading
//! sessions. Pure function of the instant plus static configuration.
//!
//! If the configured timezone name cannot be resolved, the clock fails
//! open to Regular: the only cost is that orders lose their
//! extended-hours routing flag, whereas failing the other way would send
//! extended-hours limit orders into a closed market.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use tracing::error;

use crate::config::Config;

// ─── MarketSession ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSession {
    PreMarket,
    Regular,
    PostMarket,
    Closed,
}

impl MarketSession {
    /// Pre- or post-market: limit orders priced off the quote, monitored.
    pub fn is_extended(&self) -> bool {
        matches!(self, MarketSession::PreMarket | MarketSession::PostMarket)
    }
}

// ─── SessionClock ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SessionClock {
    /// None = timezone data unavailable, classify everything as Regular.
    tz: Option<Tz>,
    pre_open: NaiveTime,
    open: NaiveTime,
    close: NaiveTime,
    post_close: NaiveTime,
}

impl SessionClock {
    pub fn new(
        tz_name: &str,
        pre_open: NaiveTime,
        open: NaiveTime,
        close: NaiveTime,
        post_close: NaiveTime,
    ) -> Self {
        let tz = match tz_name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                error!(timezone = %tz_name, "unknown market timezone, failing open to regular-hours orders");
                None
            }
        };
        Self { tz, pre_open, open, close, post_close }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.market_timezone,
            config.pre_market_open,
            config.market_open,
            config.market_close,
            config.post_market_close,
        )
    }

    /// Classify an instant. Weekends are Closed; within a trading day the
    /// four boundaries partition the day with no gaps or overlaps.
    pub fn classify(&self, now: DateTime<Utc>) -> MarketSession {
        let Some(tz) = self.tz else {
            return MarketSession::Regular;
        };

        let local = now.with_timezone(&tz);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return MarketSession::Closed;
        }

        let t = local.time();
        if t >= self.pre_open && t < self.open {
            MarketSession::PreMarket
        } else if t >= self.open && t < self.close {
            MarketSession::Regular
        } else if t >= self.close && t < self.post_close {
            MarketSession::PostMarket
        } else {
            MarketSession::Closed
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::US::Eastern;

    fn et_clock() -> SessionClock {
        SessionClock::new(
            "US/Eastern",
            NaiveTime::from_hms_opt(4, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        )
    }

    /// 2025-01-06 is a Monday.
    fn et(hour: u32, min: u32) -> DateTime<Utc> {
        Eastern
            .with_ymd_and_hms(2025, 1, 6, hour, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_session_boundaries() {
        let clock = et_clock();
        assert_eq!(clock.classify(et(3, 59)), MarketSession::Closed);
        assert_eq!(clock.classify(et(4, 0)), MarketSession::PreMarket);
        assert_eq!(clock.classify(et(9, 29)), MarketSession::PreMarket);
        assert_eq!(clock.classify(et(9, 30)), MarketSession::Regular);
        assert_eq!(clock.classify(et(15, 59)), MarketSession::Regular);
        assert_eq!(clock.classify(et(16, 0)), MarketSession::PostMarket);
        assert_eq!(clock.classify(et(19, 59)), MarketSession::PostMarket);
        assert_eq!(clock.classify(et(20, 0)), MarketSession::Closed);
        assert_eq!(clock.classify(et(23, 30)), MarketSession::Closed);
    }

    #[test]
    fn test_trading_day_partition() {
        // Every quarter hour of a Monday lands in exactly one session and
        // the interval widths add up: 5.5h pre, 6.5h regular, 4h post.
        let clock = et_clock();
        let (mut pre, mut regular, mut post, mut closed) = (0, 0, 0, 0);
        for quarter in 0..96 {
            let instant = et(quarter / 4, (quarter % 4) * 15);
            match clock.classify(instant) {
                MarketSession::PreMarket => pre += 1,
                MarketSession::Regular => regular += 1,
                MarketSession::PostMarket => post += 1,
                MarketSession::Closed => closed += 1,
            }
        }
        assert_eq!(pre, 22);
        assert_eq!(regular, 26);
        assert_eq!(post, 16);
        assert_eq!(closed, 32);
    }

    #[test]
    fn test_weekend_is_closed() {
        let clock = et_clock();
        // 2025-01-04 is a Saturday, mid regular hours.
        let saturday = Eastern
            .with_ymd_and_hms(2025, 1, 4, 10, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(clock.classify(saturday), MarketSession::Closed);
    }

    #[test]
    fn test_unknown_timezone_fails_open_to_regular() {
        let clock = SessionClock::new(
            "Mars/Olympus_Mons",
            NaiveTime::from_hms_opt(4, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        );
        assert_eq!(clock.classify(et(2, 0)), MarketSession::Regular);
        assert_eq!(clock.classify(et(17, 0)), MarketSession::Regular);
    }

    #[test]
    fn test_extended_flag() {
        assert!(MarketSession::PreMarket.is_extended());
        assert!(MarketSession::PostMarket.is_extended());
        assert!(!MarketSession::Regular.is_extended());
        assert!(!MarketSession::Closed.is_extended());
    }
}

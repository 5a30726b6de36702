//! # session
//!
//! Market-session classification and broker-session upkeep.

pub mod clock;
pub mod manager;

pub use clock::{MarketSession, SessionClock};
pub use manager::SessionManager;

//! # models::position
//!
//! Broker-reported position state. Quantities come only from a broker
//! refresh — never derived from local order history, which drifts the
//! moment a partial fill happens that only the broker knows about.

use serde::{Deserialize, Serialize};

// ─── PositionSide ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    Long,
    Short,
    Flat,
}

// ─── Position ─────────────────────────────────────────────────────────────────

/// Last known position in one symbol. Negative quantity = short.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub quantity: i64,
}

impl Position {
    pub fn flat(symbol: &str) -> Self {
        Self { symbol: symbol.to_string(), quantity: 0 }
    }

    /// Side derived from the sign of the quantity.
    pub fn side(&self) -> PositionSide {
        match self.quantity {
            q if q > 0 => PositionSide::Long,
            q if q < 0 => PositionSide::Short,
            _ => PositionSide::Flat,
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_from_sign() {
        assert_eq!(Position { symbol: "AAPL".into(), quantity: 10 }.side(), PositionSide::Long);
        assert_eq!(Position { symbol: "AAPL".into(), quantity: -4 }.side(), PositionSide::Short);
        assert_eq!(Position::flat("AAPL").side(), PositionSide::Flat);
    }
}

//! # models::signal
//!
//! Inbound webhook payload and its normalized form.
//!
//! Upstream senders template their alerts, so values routinely arrive as
//! `" {{AAPL}} "` — placeholder markers and padding are stripped before
//! validation, and both fields are uppercased.

use serde::{Deserialize, Serialize};

use crate::error::TradeError;

// ─── Action ───────────────────────────────────────────────────────────────────

/// Signal direction. Anything other than BUY/SELL is rejected upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Raw payload ──────────────────────────────────────────────────────────────

/// Webhook body exactly as posted. Missing fields default to empty so the
/// handler can reject them with a payload-level error instead of a 4xx.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSignal {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub symbol: String,
}

// ─── Signal ───────────────────────────────────────────────────────────────────

/// A validated trading signal. Ephemeral: consumed by one routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub action: Action,
    pub symbol: String,
}

impl Signal {
    /// Normalize and validate a raw payload.
    ///
    /// Validation order: empty fields first (missing payload), then the
    /// action whitelist — so a blank action reads as "Invalid payload",
    /// not "Invalid action: ".
    pub fn parse(raw: &RawSignal) -> Result<Self, TradeError> {
        let action_text = normalize(&raw.action);
        let symbol = normalize(&raw.symbol);

        if action_text.is_empty() || symbol.is_empty() {
            return Err(TradeError::Validation("missing action or symbol".into()));
        }

        let action = match action_text.as_str() {
            "BUY" => Action::Buy,
            "SELL" => Action::Sell,
            other => {
                return Err(TradeError::Validation(format!(
                    "invalid action: {other} (expected BUY or SELL)"
                )))
            }
        };

        Ok(Self { action, symbol })
    }
}

/// Strip `{{ }}` template markers, trim padding, uppercase.
fn normalize(raw: &str) -> String {
    raw.replace("{{", "").replace("}}", "").trim().to_uppercase()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(action: &str, symbol: &str) -> RawSignal {
        RawSignal { action: action.to_string(), symbol: symbol.to_string() }
    }

    #[test]
    fn test_normalizes_template_markers() {
        let signal = Signal::parse(&raw("buy", "  {{AAPL}} ")).unwrap();
        assert_eq!(signal.action, Action::Buy);
        assert_eq!(signal.symbol, "AAPL");
    }

    #[test]
    fn test_normalizes_wrapped_action() {
        let signal = Signal::parse(&raw(" {{sell}} ", "msft")).unwrap();
        assert_eq!(signal.action, Action::Sell);
        assert_eq!(signal.symbol, "MSFT");
    }

    #[test]
    fn test_rejects_unknown_action() {
        let err = Signal::parse(&raw("HOLD", "AAPL")).unwrap_err();
        assert!(matches!(err, TradeError::Validation(_)));
        assert!(err.to_string().contains("HOLD"));
    }

    #[test]
    fn test_rejects_empty_symbol() {
        let err = Signal::parse(&raw("BUY", " {{}} ")).unwrap_err();
        assert!(matches!(err, TradeError::Validation(_)));
    }

    #[test]
    fn test_rejects_empty_action() {
        let err = Signal::parse(&raw("", "AAPL")).unwrap_err();
        assert!(matches!(err, TradeError::Validation(_)));
    }
}

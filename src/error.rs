//! # error
//!
//! Failure taxonomy for signal processing.
//!
//! Nothing here crosses the HTTP boundary as a status code — the webhook
//! contract is "always 200, error in the payload" — so unlike a typical
//! axum service the variants only feed the response body and the logs.

use thiserror::Error;

use crate::broker::BrokerError;

#[derive(Debug, Error)]
pub enum TradeError {
    /// The signal payload failed normalization/validation. No broker call
    /// was made.
    #[error("Invalid signal: {0}")]
    Validation(String),

    /// No usable quote (price <= 0 or lookup failure) for an
    /// extended-hours limit order. The directional order was not placed.
    #[error("No valid price for {symbol}")]
    QuoteUnavailable { symbol: String },

    /// A gateway call failed. Terminal for the current order only.
    #[error("Broker call failed: {0}")]
    Broker(#[from] BrokerError),
}

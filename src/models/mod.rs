//! # models
//!
//! Data types shared across the relay: inbound signals, order tickets,
//! working-order state and broker positions.

pub mod order;
pub mod position;
pub mod signal;

pub use order::{Contract, OrderStatus, OrderTicket, OrderType, WorkingOrder};
pub use position::{Position, PositionSide};
pub use signal::{Action, RawSignal, Signal};

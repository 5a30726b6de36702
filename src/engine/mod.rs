//! # engine
//!
//! Signal routing and working-order supervision.

pub mod router;
pub mod supervisor;

pub use router::SignalRouter;
pub use supervisor::{MonitorConfig, OrderSupervisor};

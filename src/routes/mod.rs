//! # routes
//!
//! Axum handlers for the webhook surface.

pub mod webhook;

//! HTTP request handlers
//!
//! Thin adapters from axum extractors onto the service layer.

pub mod health;
pub mod invites;
pub mod leagues;
pub mod moderation;
pub mod rounds;
pub mod stats;
pub mod submissions;

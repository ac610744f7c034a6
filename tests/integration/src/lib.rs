//! Integration test utilities for the music league server
//!
//! Spawns the real Axum application over the in-memory backend on an
//! ephemeral port and drives it over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

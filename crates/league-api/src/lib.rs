//! # league-api
//!
//! REST API server built with Axum, plus the background task that sweeps
//! round deadlines.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, spawn_round_sweeper};
pub use state::AppState;

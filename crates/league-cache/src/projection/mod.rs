//! Projection cache implementations.
//!
//! Both backends key entries by league so a single call drops every
//! leaderboard and stats projection of that league.

mod local;
mod redis_cache;

pub use local::LocalProjectionCache;
pub use redis_cache::RedisProjectionCache;

//! # league-cache
//!
//! Caching for league read models.
//!
//! ## Features
//!
//! - **Redis pool**: deadpool-managed connections, sized from `REDIS_MAX_CONNECTIONS`
//! - **Projection caches**: [`ProjectionCache`] implementations that memoize
//!   serialized leaderboards and stats per league. [`RedisProjectionCache`]
//!   is shared across instances; [`LocalProjectionCache`] is per-process and
//!   used when no Redis is configured.
//!
//! ## Example
//!
//! ```ignore
//! use league_cache::{RedisPool, RedisPoolConfig, RedisProjectionCache};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let cache = RedisProjectionCache::new(pool, Duration::from_secs(300));
//!
//! let generation = cache.generation(league_id).await?;
//! cache.put(league_id, generation, "leaderboard:all", &json).await?;
//! cache.invalidate(league_id).await?;
//! ```
//!
//! [`ProjectionCache`]: league_core::traits::ProjectionCache

pub mod pool;
pub mod projection;

pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

pub use projection::{LocalProjectionCache, RedisProjectionCache};

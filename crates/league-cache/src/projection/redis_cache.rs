//! Redis-backed projection cache.
//!
//! Each league keeps a counter at `league:{league_id}:generation` and one
//! hash per generation at `league:{league_id}:projections:{generation}`
//! whose fields are projection keys (`leaderboard:all`, ...). Hashes carry a
//! TTL that is refreshed on every write. Invalidation increments the counter,
//! so writes made under an older generation land in a hash nobody reads.

use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, instrument};

use league_core::error::DomainError;
use league_core::traits::{ProjectionCache, RepoResult};
use league_core::value_objects::Snowflake;

use crate::pool::{RedisPool, RedisPoolError};

/// Key prefix for league projection hashes
const PROJECTION_KEY_PREFIX: &str = "league:";

/// Shared projection cache stored in Redis
#[derive(Clone, Debug)]
pub struct RedisProjectionCache {
    pool: RedisPool,
    ttl: Duration,
}

impl RedisProjectionCache {
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    fn generation_key(league_id: Snowflake) -> String {
        format!("{}{}:generation", PROJECTION_KEY_PREFIX, league_id)
    }

    fn projections_key(league_id: Snowflake, generation: u64) -> String {
        format!("{}{}:projections:{}", PROJECTION_KEY_PREFIX, league_id, generation)
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs().max(1)).unwrap_or(i64::MAX)
    }
}

fn cache_error(e: impl Into<RedisPoolError>) -> DomainError {
    DomainError::CacheError(e.into().to_string())
}

#[async_trait]
impl ProjectionCache for RedisProjectionCache {
    #[instrument(skip(self))]
    async fn generation(&self, league_id: Snowflake) -> RepoResult<u64> {
        let mut conn = self.pool.get().await.map_err(cache_error)?;
        let generation: Option<u64> = conn
            .get(Self::generation_key(league_id))
            .await
            .map_err(cache_error)?;
        Ok(generation.unwrap_or(0))
    }

    #[instrument(skip(self))]
    async fn get(
        &self,
        league_id: Snowflake,
        generation: u64,
        key: &str,
    ) -> RepoResult<Option<String>> {
        let mut conn = self.pool.get().await.map_err(cache_error)?;
        let value: Option<String> = conn
            .hget(Self::projections_key(league_id, generation), key)
            .await
            .map_err(cache_error)?;

        debug!(hit = value.is_some(), "Projection lookup");
        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn put(
        &self,
        league_id: Snowflake,
        generation: u64,
        key: &str,
        value: &str,
    ) -> RepoResult<()> {
        let mut conn = self.pool.get().await.map_err(cache_error)?;
        let hash_key = Self::projections_key(league_id, generation);

        redis::pipe()
            .atomic()
            .hset(&hash_key, key, value)
            .ignore()
            .expire(&hash_key, self.ttl_secs())
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate(&self, league_id: Snowflake) -> RepoResult<()> {
        let mut conn = self.pool.get().await.map_err(cache_error)?;
        let generation: u64 = conn
            .incr(Self::generation_key(league_id), 1)
            .await
            .map_err(cache_error)?;

        // the previous hash is unreachable now; drop it instead of waiting for its TTL
        let _: i64 = conn
            .del(Self::projections_key(league_id, generation.saturating_sub(1)))
            .await
            .map_err(cache_error)?;

        debug!(generation, "League projections invalidated");
        Ok(())
    }
}

//! Projection cache port
//!
//! Memoizes serialized read models (leaderboards, stats) per league. The
//! cache is never a source of truth: entries are dropped wholesale when a
//! league's history changes and rebuilt from the repositories on demand.
//!
//! Every league carries a generation counter. Readers take the generation
//! before loading history and write under it; [`ProjectionCache::invalidate`]
//! bumps the counter, so a projection built from history read before the
//! bump is never served afterwards.

use async_trait::async_trait;

use super::repositories::RepoResult;
use crate::value_objects::Snowflake;

#[async_trait]
pub trait ProjectionCache: Send + Sync {
    /// Current generation of the league's projections, 0 if never invalidated
    async fn generation(&self, league_id: Snowflake) -> RepoResult<u64>;

    async fn get(
        &self,
        league_id: Snowflake,
        generation: u64,
        key: &str,
    ) -> RepoResult<Option<String>>;

    /// Store a projection. Writes under an outdated generation are dropped.
    async fn put(
        &self,
        league_id: Snowflake,
        generation: u64,
        key: &str,
        value: &str,
    ) -> RepoResult<()>;

    /// Drop every projection of the league and advance its generation
    async fn invalidate(&self, league_id: Snowflake) -> RepoResult<()>;
}

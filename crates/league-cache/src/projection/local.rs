//! In-process projection cache.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use league_core::traits::{ProjectionCache, RepoResult};
use league_core::value_objects::Snowflake;

#[derive(Debug, Clone)]
struct CachedProjection {
    value: String,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct LeagueProjections {
    generation: u64,
    entries: HashMap<String, CachedProjection>,
}

/// Per-process projection cache with a fixed TTL.
///
/// Used when the service runs without Redis. Entries are grouped per league
/// so invalidation clears one map and bumps its generation.
#[derive(Debug)]
pub struct LocalProjectionCache {
    leagues: DashMap<Snowflake, LeagueProjections>,
    ttl: Duration,
}

impl LocalProjectionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            leagues: DashMap::new(),
            ttl,
        }
    }

    /// Number of leagues with at least one cached projection
    pub fn league_count(&self) -> usize {
        self.leagues
            .iter()
            .filter(|league| !league.entries.is_empty())
            .count()
    }
}

#[async_trait]
impl ProjectionCache for LocalProjectionCache {
    async fn generation(&self, league_id: Snowflake) -> RepoResult<u64> {
        Ok(self
            .leagues
            .get(&league_id)
            .map_or(0, |league| league.generation))
    }

    async fn get(
        &self,
        league_id: Snowflake,
        generation: u64,
        key: &str,
    ) -> RepoResult<Option<String>> {
        let Some(mut league) = self.leagues.get_mut(&league_id) else {
            return Ok(None);
        };
        if league.generation != generation {
            return Ok(None);
        }

        let cached = league
            .entries
            .get(key)
            .map(|entry| (entry.stored_at.elapsed() < self.ttl, entry.value.clone()));

        match cached {
            Some((true, value)) => Ok(Some(value)),
            Some((false, _)) => {
                league.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        league_id: Snowflake,
        generation: u64,
        key: &str,
        value: &str,
    ) -> RepoResult<()> {
        let mut league = self.leagues.entry(league_id).or_default();
        if league.generation != generation {
            return Ok(());
        }
        league.entries.insert(
            key.to_string(),
            CachedProjection {
                value: value.to_string(),
                stored_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn invalidate(&self, league_id: Snowflake) -> RepoResult<()> {
        let mut league = self.leagues.entry(league_id).or_default();
        league.generation += 1;
        league.entries.clear();
        Ok(())
    }
}

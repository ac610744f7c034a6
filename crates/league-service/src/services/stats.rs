//! Stats service
//!
//! Leaderboards, member statistics, head-to-head records, controversy
//! listings and round standings. Everything is recomputed from revealed
//! rounds; the projection cache only memoizes per-member statistics and is
//! dropped whenever a round of the league is revealed or archived.

use league_core::entities::Round;
use league_core::tally::{
    head_to_head, leaderboard, member_placements, member_stats_from_tallies, most_controversial,
    ControversialSubmission, HeadToHead, LeagueHistory, MemberStats, RoundTally,
};
use league_core::{DomainError, Snowflake};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

use crate::dto::{LeaderboardResponse, RankedWithTrack, RoundStandingsResponse, StandingResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guard::MembershipGuard;
use super::league::LeagueService;
use super::round::RoundService;
use super::scheduler::RoundScheduler;

pub const DEFAULT_CONTROVERSIAL_LIMIT: i64 = 10;
pub const MAX_CONTROVERSIAL_LIMIT: i64 = 100;

fn member_stats_key(season_id: Option<Snowflake>) -> String {
    match season_id {
        Some(id) => format!("member_stats:{id}"),
        None => "member_stats:all".to_string(),
    }
}

/// Drop every cached projection of a league. Cache failures are logged
/// and otherwise ignored; the next read recomputes.
pub(crate) async fn invalidate_projections(ctx: &ServiceContext, league_id: Snowflake) {
    let Some(cache) = ctx.projection_cache() else {
        return;
    };
    match cache.invalidate(league_id).await {
        Ok(()) => debug!(league_id = %league_id, "Projections invalidated"),
        Err(e) => warn!(league_id = %league_id, error = %e, "Failed to invalidate projections"),
    }
}

/// Owned copy of a league's counted history
struct History {
    rounds: Vec<Round>,
    submissions: Vec<league_core::entities::Submission>,
    votes: Vec<league_core::entities::Vote>,
}

impl History {
    fn view(&self) -> LeagueHistory<'_> {
        LeagueHistory::new(&self.rounds, &self.submissions, &self.votes)
    }
}

/// Stats service
pub struct StatsService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> StatsService<'a> {
    /// Create a new StatsService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// League leaderboard, optionally limited to one season
    #[instrument(skip(self))]
    pub async fn leaderboard(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
        season_id: Option<Snowflake>,
    ) -> ServiceResult<LeaderboardResponse> {
        MembershipGuard::new(self.ctx)
            .require_member(league_id, user_id)
            .await?;
        let season_id = LeagueService::new(self.ctx)
            .season_in_league(league_id, season_id)
            .await?;

        let stats = self.counted_stats(league_id, season_id).await?;
        Ok(LeaderboardResponse {
            league_id,
            season_id,
            rows: leaderboard(stats),
        })
    }

    /// Statistics of one member. Members without revealed history get zeroes.
    #[instrument(skip(self))]
    pub async fn member_stats(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
        target_id: Snowflake,
        season_id: Option<Snowflake>,
    ) -> ServiceResult<MemberStats> {
        MembershipGuard::new(self.ctx)
            .require_member(league_id, user_id)
            .await?;
        let season_id = LeagueService::new(self.ctx)
            .season_in_league(league_id, season_id)
            .await?;

        let stats = self.counted_stats(league_id, season_id).await?;
        Ok(stats
            .into_iter()
            .find(|stats| stats.user_id == target_id)
            .unwrap_or_else(|| MemberStats::empty(target_id)))
    }

    /// Round-by-round comparison of two members
    #[instrument(skip(self))]
    pub async fn head_to_head(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
        user_a: Snowflake,
        user_b: Snowflake,
        season_id: Option<Snowflake>,
    ) -> ServiceResult<HeadToHead> {
        MembershipGuard::new(self.ctx)
            .require_member(league_id, user_id)
            .await?;
        let season_id = LeagueService::new(self.ctx)
            .season_in_league(league_id, season_id)
            .await?;

        let history = self.history(league_id, season_id).await?;
        let placements = member_placements(&history.view().tallies());
        Ok(head_to_head(&placements, user_a, user_b))
    }

    /// Most divisive revealed submissions
    #[instrument(skip(self))]
    pub async fn controversial(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
        limit: Option<i64>,
        season_id: Option<Snowflake>,
    ) -> ServiceResult<Vec<ControversialSubmission>> {
        MembershipGuard::new(self.ctx)
            .require_member(league_id, user_id)
            .await?;
        let season_id = LeagueService::new(self.ctx)
            .season_in_league(league_id, season_id)
            .await?;

        let limit = limit
            .unwrap_or(DEFAULT_CONTROVERSIAL_LIMIT)
            .clamp(1, MAX_CONTROVERSIAL_LIMIT);
        let history = self.history(league_id, season_id).await?;
        Ok(most_controversial(
            &history.view().tallies(),
            usize::try_from(limit).unwrap_or(1),
        ))
    }

    /// Placements and scores of a revealed round
    #[instrument(skip(self))]
    pub async fn round_standings(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<RoundStandingsResponse> {
        let round = RoundService::new(self.ctx)
            .member_round(round_id, user_id)
            .await?;
        if !round.status.is_revealed() {
            return Err(DomainError::ResultsNotRevealed.into());
        }

        let submissions = self.ctx.submission_repo().find_by_round(round.id).await?;
        let votes = self.ctx.vote_repo().find_by_round(round.id).await?;
        let tally = RoundTally::compute(round.id, &submissions, &votes);

        let by_id: HashMap<Snowflake, &league_core::entities::Submission> =
            submissions.iter().map(|s| (s.id, s)).collect();
        let standings: Vec<StandingResponse> = tally
            .entries
            .iter()
            .filter_map(|ranked| {
                by_id
                    .get(&ranked.entry.submission_id)
                    .map(|submission| StandingResponse::from(RankedWithTrack { ranked, submission }))
            })
            .collect();

        Ok(RoundStandingsResponse {
            round_id: round.id,
            status: round.status,
            standings,
        })
    }

    /// Statistics of everyone in the counted history, voters included
    async fn counted_stats(
        &self,
        league_id: Snowflake,
        season_id: Option<Snowflake>,
    ) -> ServiceResult<Vec<MemberStats>> {
        self.settle_due_rounds(league_id).await?;

        // taken before the history is read so a reveal in between voids the write
        let generation = self.generation(league_id).await;
        let key = member_stats_key(season_id);
        if let Some(generation) = generation {
            if let Some(stats) = self
                .cached::<Vec<MemberStats>>(league_id, generation, &key)
                .await
            {
                debug!(league_id = %league_id, key, generation, "Member stats served from cache");
                return Ok(stats);
            }
        }

        let history = self.history(league_id, season_id).await?;
        let view = history.view();
        let stats: Vec<MemberStats> = member_stats_from_tallies(&view.tallies(), &view)
            .into_values()
            .collect();

        if let Some(generation) = generation {
            self.store(league_id, generation, &key, &stats).await;
        }
        Ok(stats)
    }

    /// Counted history, read after any overdue round has been settled
    async fn history(
        &self,
        league_id: Snowflake,
        season_id: Option<Snowflake>,
    ) -> ServiceResult<History> {
        self.settle_due_rounds(league_id).await?;

        let rounds = self
            .ctx
            .round_repo()
            .find_revealed(league_id, season_id)
            .await?;
        let ids: Vec<Snowflake> = rounds.iter().map(|r| r.id).collect();
        let submissions = self.ctx.submission_repo().find_by_rounds(&ids).await?;
        let votes = self.ctx.vote_repo().find_by_rounds(&ids).await?;

        Ok(History {
            rounds,
            submissions,
            votes,
        })
    }

    async fn settle_due_rounds(&self, league_id: Snowflake) -> ServiceResult<()> {
        let now = self.ctx.now();
        let scheduler = RoundScheduler::new(self.ctx);
        for round in self.ctx.round_repo().find_by_league(league_id).await? {
            if round.due_transition(now).is_some() {
                scheduler.settle(round).await?;
            }
        }
        Ok(())
    }

    /// Current cache generation, or `None` when projections can't be cached
    async fn generation(&self, league_id: Snowflake) -> Option<u64> {
        let cache = self.ctx.projection_cache()?;
        match cache.generation(league_id).await {
            Ok(generation) => Some(generation),
            Err(e) => {
                warn!(league_id = %league_id, error = %e, "Projection generation read failed");
                None
            }
        }
    }

    async fn cached<T: DeserializeOwned>(
        &self,
        league_id: Snowflake,
        generation: u64,
        key: &str,
    ) -> Option<T> {
        let cache = self.ctx.projection_cache()?;
        let raw = match cache.get(league_id, generation, key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(league_id = %league_id, key, error = %e, "Projection cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(league_id = %league_id, key, error = %e, "Discarding unreadable projection");
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, league_id: Snowflake, generation: u64, key: &str, value: &T) {
        let Some(cache) = self.ctx.projection_cache() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(league_id = %league_id, key, error = %e, "Failed to encode projection");
                return;
            }
        };
        if let Err(e) = cache.put(league_id, generation, key, &raw).await {
            warn!(league_id = %league_id, key, error = %e, "Projection cache write failed");
        }
    }
}

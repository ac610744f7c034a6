//! Round service
//!
//! Round creation and editing, manual phase changes and reads. Every read
//! settles the round against the clock first.

use league_core::entities::{Round, RoundSchedule};
use league_core::lifecycle::ensure_action;
use league_core::{DomainError, RoundActions, RoundStatus, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{AdvanceRoundRequest, CreateRoundRequest, RoundResponse, UpdateRoundRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guard::MembershipGuard;
use super::league::LeagueService;
use super::parse_id;
use super::scheduler::RoundScheduler;
use super::stats::invalidate_projections;

/// Round service
pub struct RoundService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoundService<'a> {
    /// Create a new RoundService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a round (owner or admin). It starts in draft unless `open` is set.
    #[instrument(skip(self, request))]
    pub async fn create_round(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
        request: CreateRoundRequest,
    ) -> ServiceResult<RoundResponse> {
        MembershipGuard::new(self.ctx)
            .require_manager(league_id, user_id)
            .await?;

        let schedule = RoundSchedule::from(request.schedule);
        schedule.validate()?;

        let season_id = request
            .season_id
            .as_deref()
            .map(|raw| parse_id("season_id", raw))
            .transpose()?;
        let season_id = LeagueService::new(self.ctx)
            .season_in_league(league_id, season_id)
            .await?;

        let now = self.ctx.now();
        let round = Round::new(
            self.ctx.generate_id(),
            league_id,
            request.theme.trim().to_string(),
            user_id,
            now,
        )
        .with_description(request.description)
        .with_season(season_id)
        .with_schedule(schedule);

        self.ctx.round_repo().create(&round).await?;
        info!(round_id = %round.id, league_id = %league_id, "Round created");

        if !request.open {
            return Ok(RoundResponse::from(round));
        }

        let opened = self
            .ctx
            .round_repo()
            .transition(round.id, RoundStatus::Draft, RoundStatus::Submitting, now)
            .await?;
        info!(round_id = %round.id, "Round opened for submissions");
        Ok(RoundResponse::from(opened))
    }

    /// Edit theme, description, season or schedule while in draft or submitting
    #[instrument(skip(self, request))]
    pub async fn update_round(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
        request: UpdateRoundRequest,
    ) -> ServiceResult<RoundResponse> {
        let round = self.load(round_id).await?;
        MembershipGuard::new(self.ctx)
            .require_manager(round.league_id, user_id)
            .await?;
        let round = RoundScheduler::new(self.ctx).settle(round).await?;

        let now = self.ctx.now();
        ensure_action(&round, RoundActions::EDIT, now)?;

        let expected = round.status;
        let mut updated = round;
        if let Some(theme) = request.theme {
            updated.theme = theme.trim().to_string();
        }
        if request.description.is_some() {
            updated.description = request.description;
        }
        if let Some(raw) = request.season_id.as_deref() {
            let season_id = parse_id("season_id", raw)?;
            updated.season_id = LeagueService::new(self.ctx)
                .season_in_league(updated.league_id, Some(season_id))
                .await?;
        }
        if let Some(schedule) = request.schedule {
            let schedule = RoundSchedule::from(schedule);
            schedule.validate()?;
            updated.schedule = schedule;
        }
        updated.updated_at = now;

        self.ctx.round_repo().update_details(&updated, expected).await?;
        info!(round_id = %round_id, updated_by = %user_id, "Round updated");
        Ok(RoundResponse::from(updated))
    }

    /// Move a round forward along the lifecycle (owner or admin).
    ///
    /// Without an explicit target the round moves to its next phase. Only
    /// forward edges are accepted here; the revert edge has its own call.
    #[instrument(skip(self))]
    pub async fn advance_round(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
        request: AdvanceRoundRequest,
    ) -> ServiceResult<RoundResponse> {
        let round = self.load(round_id).await?;
        MembershipGuard::new(self.ctx)
            .require_manager(round.league_id, user_id)
            .await?;
        let round = RoundScheduler::new(self.ctx).settle(round).await?;

        let from = round.status;
        let Some(next) = from.next() else {
            return Err(DomainError::IllegalTransition {
                from,
                to: request.to.unwrap_or(from),
            }
            .into());
        };
        let to = request.to.unwrap_or(next);
        if to != next {
            return Err(DomainError::IllegalTransition { from, to }.into());
        }

        let updated = self
            .ctx
            .round_repo()
            .transition(round_id, from, to, self.ctx.now())
            .await?;

        info!(round_id = %round_id, %from, %to, advanced_by = %user_id, "Round advanced");
        if to.is_revealed() {
            invalidate_projections(self.ctx, round.league_id).await;
        }
        Ok(RoundResponse::from(updated))
    }

    /// Send a round in voting back to submitting (owner or admin).
    ///
    /// Every vote cast so far is discarded and a submission deadline that
    /// has already passed is cleared, both with the status change itself.
    #[instrument(skip(self))]
    pub async fn revert_round(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<RoundResponse> {
        let round = self.load(round_id).await?;
        MembershipGuard::new(self.ctx)
            .require_manager(round.league_id, user_id)
            .await?;
        let round = RoundScheduler::new(self.ctx).settle(round).await?;

        let from = round.status;
        let to = from
            .revert_target()
            .ok_or(DomainError::IllegalTransition {
                from,
                to: RoundStatus::Submitting,
            })?;

        let reverted = self
            .ctx
            .round_repo()
            .transition(round_id, from, to, self.ctx.now())
            .await?;
        warn!(round_id = %round_id, reverted_by = %user_id, "Round reverted to submitting, votes discarded");

        Ok(RoundResponse::from(reverted))
    }

    /// Rounds of a league, newest first (members)
    #[instrument(skip(self))]
    pub async fn list_rounds(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<RoundResponse>> {
        MembershipGuard::new(self.ctx)
            .require_member(league_id, user_id)
            .await?;

        let scheduler = RoundScheduler::new(self.ctx);
        let rounds = self.ctx.round_repo().find_by_league(league_id).await?;
        let mut responses = Vec::with_capacity(rounds.len());
        for round in rounds {
            responses.push(RoundResponse::from(scheduler.settle(round).await?));
        }
        Ok(responses)
    }

    /// A single round (members)
    #[instrument(skip(self))]
    pub async fn get_round(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<RoundResponse> {
        let round = self.member_round(round_id, user_id).await?;
        Ok(RoundResponse::from(round))
    }

    /// Load a settled round the caller may see
    pub(crate) async fn member_round(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Round> {
        let round = self.load(round_id).await?;
        MembershipGuard::new(self.ctx)
            .require_member(round.league_id, user_id)
            .await?;
        RoundScheduler::new(self.ctx).settle(round).await
    }

    async fn load(&self, round_id: Snowflake) -> ServiceResult<Round> {
        Ok(self
            .ctx
            .round_repo()
            .find_by_id(round_id)
            .await?
            .ok_or(DomainError::RoundNotFound(round_id))?)
    }
}

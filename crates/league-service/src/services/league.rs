//! League service
//!
//! Handles league creation, lookup, member listing and seasons.

use league_core::entities::{League, LeagueMember, LeagueSettings, Season, Visibility};
use league_core::{DomainError, MemberRole, Snowflake};
use tracing::{info, instrument};

use crate::dto::{
    CreateLeagueRequest, CreateSeasonRequest, LeagueResponse, MemberResponse, SeasonResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guard::MembershipGuard;

/// League service
pub struct LeagueService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LeagueService<'a> {
    /// Create a new LeagueService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a league; the caller becomes its owner
    #[instrument(skip(self, request))]
    pub async fn create_league(
        &self,
        owner_id: Snowflake,
        request: CreateLeagueRequest,
    ) -> ServiceResult<LeagueResponse> {
        request.empty_round_policy.validate()?;

        let defaults = LeagueSettings::default();
        let settings = LeagueSettings {
            scoring_mode: request.scoring_mode,
            allow_multiple_submissions: request.allow_multiple_submissions,
            max_points_per_vote: request
                .max_points_per_vote
                .unwrap_or(defaults.max_points_per_vote),
            empty_round_policy: request.empty_round_policy,
        };

        let now = self.ctx.now();
        let league = League::new(self.ctx.generate_id(), request.name, owner_id, now)
            .with_description(request.description)
            .with_visibility(request.visibility)
            .with_settings(settings);
        let owner = LeagueMember::new(
            self.ctx.generate_id(),
            league.id,
            owner_id,
            MemberRole::Owner,
            now,
        );

        self.ctx.league_repo().create_with_owner(&league, &owner).await?;

        info!(league_id = %league.id, owner_id = %owner_id, "League created");

        let mut response = LeagueResponse::from(&league);
        response.member_count = Some(1);
        response.my_role = Some(MemberRole::Owner);
        Ok(response)
    }

    /// Get a league. Private leagues are visible to members only.
    #[instrument(skip(self))]
    pub async fn get_league(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<LeagueResponse> {
        let guard = MembershipGuard::new(self.ctx);
        let league = guard.league(league_id).await?;
        let membership = guard.membership(league_id, user_id).await?;

        if membership.is_none() && league.visibility == Visibility::Private {
            return Err(DomainError::NotAMember.into());
        }

        let mut response = LeagueResponse::from(&league);
        response.member_count = Some(self.ctx.league_repo().member_count(league_id).await?);
        response.my_role = membership.map(|m| m.role);
        Ok(response)
    }

    /// Leagues the caller currently belongs to
    #[instrument(skip(self))]
    pub async fn list_my_leagues(&self, user_id: Snowflake) -> ServiceResult<Vec<LeagueResponse>> {
        let leagues = self.ctx.league_repo().find_by_member(user_id).await?;
        let mut responses = Vec::with_capacity(leagues.len());
        for league in &leagues {
            let mut response = LeagueResponse::from(league);
            response.my_role = self
                .ctx
                .member_repo()
                .find_active(league.id, user_id)
                .await?
                .map(|m| m.role);
            responses.push(response);
        }
        Ok(responses)
    }

    /// Active members, by join time
    #[instrument(skip(self))]
    pub async fn list_members(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<MemberResponse>> {
        MembershipGuard::new(self.ctx)
            .require_member(league_id, user_id)
            .await?;

        let members = self.ctx.member_repo().find_active_by_league(league_id).await?;
        Ok(members.iter().map(MemberResponse::from).collect())
    }

    /// Create a season (owner or admin)
    #[instrument(skip(self, request))]
    pub async fn create_season(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
        request: CreateSeasonRequest,
    ) -> ServiceResult<SeasonResponse> {
        MembershipGuard::new(self.ctx)
            .require_manager(league_id, user_id)
            .await?;

        let season = Season::new(
            self.ctx.generate_id(),
            league_id,
            request.name.trim().to_string(),
            self.ctx.now(),
        );
        self.ctx.season_repo().create(&season).await?;

        info!(league_id = %league_id, season_id = %season.id, "Season created");
        Ok(SeasonResponse::from(&season))
    }

    /// Seasons of a league, oldest first
    #[instrument(skip(self))]
    pub async fn list_seasons(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<SeasonResponse>> {
        MembershipGuard::new(self.ctx)
            .require_member(league_id, user_id)
            .await?;

        let seasons = self.ctx.season_repo().find_by_league(league_id).await?;
        Ok(seasons.iter().map(SeasonResponse::from).collect())
    }

    /// Resolve an optional season id against the league it must belong to
    pub(crate) async fn season_in_league(
        &self,
        league_id: Snowflake,
        season_id: Option<Snowflake>,
    ) -> ServiceResult<Option<Snowflake>> {
        let Some(season_id) = season_id else {
            return Ok(None);
        };
        match self.ctx.season_repo().find_by_id(season_id).await? {
            Some(season) if season.league_id == league_id => Ok(Some(season.id)),
            _ => Err(DomainError::SeasonNotFound(season_id).into()),
        }
    }
}

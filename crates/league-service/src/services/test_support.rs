//! Shared fixtures for service tests

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use league_common::auth::JwtService;
use league_core::entities::Round;
use league_core::traits::{Clock, ManualClock, ProjectionCache};
use league_core::{EmptyRoundPolicy, MemberRole, RoundStatus, ScoringMode, Snowflake};
use league_db::MemoryStore;

use crate::dto::{
    AdvanceRoundRequest, ChangeRoleRequest, CreateInviteRequest, CreateLeagueRequest,
    CreateRoundRequest, RoundResponse, ScheduleRequest, SubmitTrackRequest,
};

use super::{
    InviteService, LeagueService, ModerationService, RoundService, ServiceContext,
    SubmissionService,
};

pub(crate) fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 18, 0, 0).unwrap()
}

pub(crate) fn track(title: &str) -> SubmitTrackRequest {
    SubmitTrackRequest {
        title: title.to_string(),
        artist: format!("{title} Band"),
        album: None,
        external_id: None,
        genre: Some("indie".to_string()),
    }
}

/// A league on a fresh in-memory store, driven by a manual clock
pub(crate) struct TestLeague {
    pub ctx: ServiceContext,
    pub clock: Arc<ManualClock>,
    pub id: Snowflake,
    pub owner: Snowflake,
}

impl TestLeague {
    pub async fn new() -> Self {
        Self::with_policy(EmptyRoundPolicy::Hold).await
    }

    pub async fn with_policy(policy: EmptyRoundPolicy) -> Self {
        Self::build(policy, ScoringMode::Points, None).await
    }

    /// A league scored with up and down votes
    pub async fn reactions() -> Self {
        Self::build(EmptyRoundPolicy::Hold, ScoringMode::Reactions, None).await
    }

    pub async fn with_cache(cache: Arc<dyn ProjectionCache>) -> Self {
        Self::build(EmptyRoundPolicy::Hold, ScoringMode::Points, Some(cache)).await
    }

    async fn build(
        policy: EmptyRoundPolicy,
        scoring_mode: ScoringMode,
        cache: Option<Arc<dyn ProjectionCache>>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new(start()));
        let mut builder = ServiceContext::builder()
            .memory_store(Arc::new(MemoryStore::new()))
            .jwt_service(Arc::new(JwtService::new("test-secret", 3600)))
            .clock(clock.clone());
        if let Some(cache) = cache {
            builder = builder.projection_cache(cache);
        }
        let ctx = builder.build().unwrap();
        Self::create_in(ctx, clock, policy, scoring_mode).await
    }

    /// Another league in the same store and clock
    pub async fn sharing(other: &TestLeague) -> Self {
        Self::create_in(
            other.ctx.clone(),
            other.clock.clone(),
            EmptyRoundPolicy::Hold,
            ScoringMode::Points,
        )
        .await
    }

    async fn create_in(
        ctx: ServiceContext,
        clock: Arc<ManualClock>,
        policy: EmptyRoundPolicy,
        scoring_mode: ScoringMode,
    ) -> Self {
        let owner = ctx.generate_id();
        let league = LeagueService::new(&ctx)
            .create_league(
                owner,
                CreateLeagueRequest {
                    name: "Friday Tunes".into(),
                    description: None,
                    visibility: Default::default(),
                    scoring_mode,
                    allow_multiple_submissions: false,
                    max_points_per_vote: None,
                    empty_round_policy: policy,
                },
            )
            .await
            .unwrap();

        Self {
            ctx,
            clock,
            id: league.id,
            owner,
        }
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// A new user joins through a fresh invite
    pub async fn join(&self) -> Snowflake {
        let user = self.ctx.generate_id();
        let invite = InviteService::new(&self.ctx)
            .create_invite(self.id, self.owner, CreateInviteRequest::default())
            .await
            .unwrap();
        InviteService::new(&self.ctx)
            .redeem(&invite.code, user)
            .await
            .unwrap();
        user
    }

    /// A new user joins and is promoted to admin by the owner
    pub async fn join_admin(&self) -> Snowflake {
        let user = self.join().await;
        ModerationService::new(&self.ctx)
            .change_role(
                self.id,
                self.owner,
                user,
                ChangeRoleRequest {
                    role: MemberRole::Admin,
                    reason: None,
                },
            )
            .await
            .unwrap();
        user
    }

    /// A round opened for submissions with no deadlines
    pub async fn open_round(&self) -> RoundResponse {
        self.create_round(ScheduleRequest::default()).await
    }

    /// A round opened now that closes submissions after `submit_hours` and
    /// voting `vote_hours` later
    pub async fn open_round_with_deadlines(&self, submit_hours: i64, vote_hours: i64) -> RoundResponse {
        let submission_end = self.clock_now() + Duration::hours(submit_hours);
        self.create_round(ScheduleRequest {
            submission_start: None,
            submission_end: Some(submission_end),
            voting_start: None,
            voting_end: Some(submission_end + Duration::hours(vote_hours)),
        })
        .await
    }

    async fn create_round(&self, schedule: ScheduleRequest) -> RoundResponse {
        RoundService::new(&self.ctx)
            .create_round(
                self.id,
                self.owner,
                CreateRoundRequest {
                    theme: "Songs about rain".into(),
                    description: None,
                    season_id: None,
                    schedule,
                    open: true,
                },
            )
            .await
            .unwrap()
    }

    /// Each user submits one track, then the owner opens voting.
    /// Returns the submission ids in the order of `users`.
    pub async fn round_in_voting(&self, users: &[Snowflake]) -> (RoundResponse, Vec<Snowflake>) {
        let round = self.open_round().await;
        let mut submissions = Vec::with_capacity(users.len());
        for (i, user) in users.iter().enumerate() {
            let submission = SubmissionService::new(&self.ctx)
                .submit(round.id, *user, track(&format!("Track {i}")))
                .await
                .unwrap();
            submissions.push(submission.id);
        }
        self.advance(round.id, RoundStatus::Voting).await;
        (round, submissions)
    }

    pub async fn advance(&self, round_id: Snowflake, to: RoundStatus) -> RoundResponse {
        RoundService::new(&self.ctx)
            .advance_round(round_id, self.owner, AdvanceRoundRequest { to: Some(to) })
            .await
            .unwrap()
    }

    pub async fn round(&self, round_id: Snowflake) -> Round {
        self.ctx
            .round_repo()
            .find_by_id(round_id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn status_of(&self, round_id: Snowflake) -> RoundStatus {
        self.round(round_id).await.status
    }
}

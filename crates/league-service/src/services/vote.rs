//! Vote service
//!
//! Ballots are one row per (submission, voter). Casting again replaces the
//! previous value.

use league_core::entities::Vote;
use league_core::lifecycle::ensure_action;
use league_core::{DomainError, RoundActions, Snowflake};
use tracing::{debug, info, instrument, warn};

use crate::dto::{CastVoteRequest, VoteResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guard::MembershipGuard;
use super::round::RoundService;
use super::submission::SubmissionService;

/// Vote service
pub struct VoteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VoteService<'a> {
    /// Create a new VoteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cast or replace a vote on a submission
    #[instrument(skip(self, request))]
    pub async fn cast_vote(
        &self,
        submission_id: Snowflake,
        voter_id: Snowflake,
        request: CastVoteRequest,
    ) -> ServiceResult<VoteResponse> {
        let (submission, round) = SubmissionService::new(self.ctx)
            .member_submission(submission_id, voter_id)
            .await?;
        let now = self.ctx.now();
        ensure_action(&round, RoundActions::VOTE, now)?;

        if submission.is_owned_by(voter_id) {
            warn!(submission_id = %submission_id, voter_id = %voter_id, "Self-vote refused");
            return Err(DomainError::SelfVote.into());
        }

        let league = MembershipGuard::new(self.ctx)
            .league(round.league_id)
            .await?;
        request
            .value
            .validate_for(league.settings.scoring_mode, league.settings.max_points_per_vote)?;

        let vote = Vote::new(
            self.ctx.generate_id(),
            round.id,
            submission.id,
            voter_id,
            request.value,
            now,
        );
        let stored = self.ctx.vote_repo().upsert(&vote).await?;

        debug!(
            round_id = %round.id,
            submission_id = %submission_id,
            voter_id = %voter_id,
            replaced = stored.id != vote.id,
            "Vote cast"
        );
        Ok(VoteResponse::from(&stored))
    }

    /// Retract the caller's vote on a submission while voting is open
    #[instrument(skip(self))]
    pub async fn retract_vote(
        &self,
        submission_id: Snowflake,
        voter_id: Snowflake,
    ) -> ServiceResult<()> {
        let (submission, round) = SubmissionService::new(self.ctx)
            .member_submission(submission_id, voter_id)
            .await?;
        ensure_action(&round, RoundActions::VOTE, self.ctx.now())?;

        self.ctx
            .vote_repo()
            .delete(round.id, submission.id, voter_id)
            .await?;

        info!(round_id = %round.id, submission_id = %submission_id, voter_id = %voter_id, "Vote retracted");
        Ok(())
    }

    /// Votes of a round: the caller's own until reveal, everyone's after
    #[instrument(skip(self))]
    pub async fn list_votes(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<VoteResponse>> {
        let round = RoundService::new(self.ctx)
            .member_round(round_id, user_id)
            .await?;

        let votes = if round.status.is_revealed() {
            self.ctx.vote_repo().find_by_round(round.id).await?
        } else {
            self.ctx.vote_repo().find_by_voter(round.id, user_id).await?
        };
        Ok(votes.iter().map(VoteResponse::from).collect())
    }
}

//! Submission service
//!
//! Track submissions. Submitters stay anonymous until the round is revealed,
//! except to themselves.

use league_core::entities::{ReactionCount, Submission, Track};
use league_core::lifecycle::{ensure_submission, is_held};
use league_core::{DomainError, Snowflake};
use tracing::{info, instrument};

use crate::dto::{SubmissionResponse, SubmissionView, SubmitTrackRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guard::MembershipGuard;
use super::round::RoundService;

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Submission service
pub struct SubmissionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SubmissionService<'a> {
    /// Create a new SubmissionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Submit a track to a round in its submission window.
    ///
    /// A round held open because nobody entered before its deadline keeps
    /// accepting entries; the next settle moves it on.
    #[instrument(skip(self, request))]
    pub async fn submit(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
        request: SubmitTrackRequest,
    ) -> ServiceResult<SubmissionResponse> {
        let round = RoundService::new(self.ctx)
            .member_round(round_id, user_id)
            .await?;
        let league = MembershipGuard::new(self.ctx)
            .league(round.league_id)
            .await?;

        let now = self.ctx.now();
        let held = if round.due_transition(now).is_some() {
            let count = self.ctx.submission_repo().count_by_round(round.id).await?;
            is_held(
                &round,
                usize::try_from(count).unwrap_or(0),
                league.settings.empty_round_policy,
                now,
            )
        } else {
            false
        };
        ensure_submission(&round, held, now)?;

        let track = Track {
            title: request.title.trim().to_string(),
            artist: request.artist.trim().to_string(),
            album: clean(request.album),
            external_id: clean(request.external_id),
            genre: clean(request.genre),
        };
        let submission = Submission::new(
            self.ctx.generate_id(),
            round.id,
            round.league_id,
            user_id,
            track,
            now,
        );

        self.ctx
            .submission_repo()
            .create(&submission, league.settings.allow_multiple_submissions)
            .await?;

        info!(
            submission_id = %submission.id,
            round_id = %round.id,
            user_id = %user_id,
            "Track submitted"
        );

        Ok(SubmissionResponse::from(SubmissionView {
            submission: &submission,
            reveal_submitter: round.status.is_revealed(),
            is_mine: true,
            reactions: &[],
        }))
    }

    /// Submissions of a round with reaction summaries, in submission order
    #[instrument(skip(self))]
    pub async fn list_submissions(
        &self,
        round_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<SubmissionResponse>> {
        let round = RoundService::new(self.ctx)
            .member_round(round_id, user_id)
            .await?;
        let reveal = round.status.is_revealed();

        let submissions = self.ctx.submission_repo().find_by_round(round.id).await?;
        let mut responses = Vec::with_capacity(submissions.len());
        for submission in &submissions {
            let reactions = self
                .ctx
                .reaction_repo()
                .find_by_submission(submission.id)
                .await?;
            let summary = ReactionCount::summarize(&reactions, user_id);
            responses.push(SubmissionResponse::from(SubmissionView {
                submission,
                reveal_submitter: reveal,
                is_mine: submission.is_owned_by(user_id),
                reactions: &summary,
            }));
        }
        Ok(responses)
    }

    /// Load a submission together with its round, settled, for a member
    pub(crate) async fn member_submission(
        &self,
        submission_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<(Submission, league_core::entities::Round)> {
        let submission = self
            .ctx
            .submission_repo()
            .find_by_id(submission_id)
            .await?
            .ok_or(DomainError::SubmissionNotFound(submission_id))?;
        let round = RoundService::new(self.ctx)
            .member_round(submission.round_id, user_id)
            .await?;
        Ok((submission, round))
    }
}

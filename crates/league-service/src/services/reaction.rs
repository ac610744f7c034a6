//! Reaction service
//!
//! Emoji reactions and comments on submissions. Both open once voting starts
//! and stay open through reveal and archive.

use league_core::entities::{Comment, Reaction, MAX_COMMENT_LENGTH};
use league_core::lifecycle::ensure_action;
use league_core::{DomainError, RoundActions, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{CommentResponse, CreateCommentRequest, ReactionToggleResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guard::MembershipGuard;
use super::submission::SubmissionService;

/// Longest accepted emoji string, in bytes
const MAX_EMOJI_LEN: usize = 64;

fn validate_emoji(emoji: &str) -> ServiceResult<()> {
    if emoji.is_empty() || emoji.len() > MAX_EMOJI_LEN || emoji.chars().any(char::is_whitespace) {
        return Err(ServiceError::validation("invalid emoji"));
    }
    Ok(())
}

/// Reaction and comment service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add the reaction if absent, remove it if present
    #[instrument(skip(self))]
    pub async fn toggle_reaction(
        &self,
        submission_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> ServiceResult<ReactionToggleResponse> {
        validate_emoji(emoji)?;

        let (submission, round) = SubmissionService::new(self.ctx)
            .member_submission(submission_id, user_id)
            .await?;
        let now = self.ctx.now();
        ensure_action(&round, RoundActions::REACT, now)?;

        let reacted = self
            .ctx
            .reaction_repo()
            .toggle(&Reaction {
                submission_id: submission.id,
                user_id,
                emoji: emoji.to_string(),
                created_at: now,
            })
            .await?;

        debug!(submission_id = %submission_id, user_id = %user_id, emoji, reacted, "Reaction toggled");
        Ok(ReactionToggleResponse {
            submission_id,
            emoji: emoji.to_string(),
            reacted,
        })
    }

    /// Comment on a submission
    #[instrument(skip(self, request))]
    pub async fn add_comment(
        &self,
        submission_id: Snowflake,
        user_id: Snowflake,
        request: CreateCommentRequest,
    ) -> ServiceResult<CommentResponse> {
        let content = request.content.trim();
        if content.is_empty() {
            return Err(ServiceError::validation("comment cannot be empty"));
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_COMMENT_LENGTH,
            }
            .into());
        }

        let (submission, round) = SubmissionService::new(self.ctx)
            .member_submission(submission_id, user_id)
            .await?;
        let now = self.ctx.now();
        ensure_action(&round, RoundActions::COMMENT, now)?;

        let comment = Comment {
            id: self.ctx.generate_id(),
            round_id: round.id,
            submission_id: submission.id,
            author_id: user_id,
            content: content.to_string(),
            created_at: now,
        };
        self.ctx.comment_repo().create(&comment).await?;

        info!(comment_id = %comment.id, submission_id = %submission_id, author_id = %user_id, "Comment added");
        Ok(CommentResponse::from(&comment))
    }

    /// Comments on a submission, oldest first
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        submission_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<CommentResponse>> {
        SubmissionService::new(self.ctx)
            .member_submission(submission_id, user_id)
            .await?;

        let comments = self
            .ctx
            .comment_repo()
            .find_by_submission(submission_id)
            .await?;
        Ok(comments.iter().map(CommentResponse::from).collect())
    }

    /// Delete a comment; authors delete their own, owners and admins any
    #[instrument(skip(self))]
    pub async fn delete_comment(
        &self,
        comment_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        let comment = self
            .ctx
            .comment_repo()
            .find_by_id(comment_id)
            .await?
            .ok_or(DomainError::CommentNotFound(comment_id))?;
        let (submission, _) = SubmissionService::new(self.ctx)
            .member_submission(comment.submission_id, user_id)
            .await?;

        if comment.author_id != user_id {
            let member = MembershipGuard::new(self.ctx)
                .require_member(submission.league_id, user_id)
                .await?;
            if !member.role.is_manager() {
                return Err(DomainError::NotCommentAuthor.into());
            }
        }

        self.ctx.comment_repo().delete(comment_id).await?;
        info!(comment_id = %comment_id, deleted_by = %user_id, "Comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::RoundStatus;

    use crate::services::test_support::TestLeague;
    use crate::services::SubmissionService;

    fn comment(content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            content: content.to_string(),
        }
    }

    #[test]
    fn test_emoji_validation() {
        assert!(validate_emoji("🔥").is_ok());
        assert!(validate_emoji("").is_err());
        assert!(validate_emoji("a b").is_err());
        assert!(validate_emoji(&"x".repeat(65)).is_err());
    }

    #[tokio::test]
    async fn test_toggle_reports_resulting_state() {
        let league = TestLeague::new().await;
        let (a, b) = (league.join().await, league.join().await);
        let (round, subs) = league.round_in_voting(&[a]).await;
        let service = ReactionService::new(&league.ctx);

        assert!(service.toggle_reaction(subs[0], b, "🔥").await.unwrap().reacted);
        assert!(service.toggle_reaction(subs[0], a, "🔥").await.unwrap().reacted);

        let listed = SubmissionService::new(&league.ctx)
            .list_submissions(round.id, b)
            .await
            .unwrap();
        assert_eq!(listed[0].reactions[0].count, 2);
        assert!(listed[0].reactions[0].me);

        assert!(!service.toggle_reaction(subs[0], b, "🔥").await.unwrap().reacted);
    }

    #[tokio::test]
    async fn test_reactions_closed_while_submitting() {
        let league = TestLeague::new().await;
        let member = league.join().await;
        let round = league.open_round().await;
        let sub = SubmissionService::new(&league.ctx)
            .submit(round.id, member, crate::services::test_support::track("Song"))
            .await
            .unwrap();

        let err = ReactionService::new(&league.ctx)
            .toggle_reaction(sub.id, league.owner, "🔥")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);

        let err = ReactionService::new(&league.ctx)
            .add_comment(sub.id, league.owner, comment("nice"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_comments_survive_reveal_and_archive() {
        let league = TestLeague::new().await;
        let member = league.join().await;
        let (round, subs) = league.round_in_voting(&[member]).await;
        let service = ReactionService::new(&league.ctx);

        service
            .add_comment(subs[0], league.owner, comment("great pick"))
            .await
            .unwrap();
        league.advance(round.id, RoundStatus::Revealed).await;
        league.advance(round.id, RoundStatus::Archived).await;
        service
            .add_comment(subs[0], member, comment("thanks"))
            .await
            .unwrap();

        let comments = service.list_comments(subs[0], member).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "great pick");
    }

    #[tokio::test]
    async fn test_comment_length_limit() {
        let league = TestLeague::new().await;
        let member = league.join().await;
        let (_, subs) = league.round_in_voting(&[member]).await;

        let err = ReactionService::new(&league.ctx)
            .add_comment(subs[0], league.owner, comment(&"x".repeat(2001)))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::ContentTooLong { max: 2000 })
        ));
    }

    #[tokio::test]
    async fn test_comment_deletion_rights() {
        let league = TestLeague::new().await;
        let (a, b) = (league.join().await, league.join().await);
        let (_, subs) = league.round_in_voting(&[a]).await;
        let service = ReactionService::new(&league.ctx);

        let by_a = service.add_comment(subs[0], a, comment("mine")).await.unwrap();
        let err = service.delete_comment(by_a.id, b).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::NotCommentAuthor)));

        service.delete_comment(by_a.id, a).await.unwrap();

        let by_b = service.add_comment(subs[0], b, comment("rude")).await.unwrap();
        service.delete_comment(by_b.id, league.owner).await.unwrap();
        assert!(service.list_comments(subs[0], a).await.unwrap().is_empty());
    }
}

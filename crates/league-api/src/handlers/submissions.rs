//! Submission handlers
//!
//! Track submissions plus everything hanging off a submission: votes,
//! reactions and comments.

use axum::{
    extract::{Path, State},
    Json,
};
use league_service::dto::{
    CastVoteRequest, CommentResponse, CreateCommentRequest, ReactionToggleResponse,
    SubmissionResponse, SubmitTrackRequest, VoteResponse,
};
use league_service::{ReactionService, SubmissionService, VoteService};

use crate::extractors::{
    AuthUser, CommentPath, ReactionPath, RoundPath, SubmissionPath, ValidatedJson,
};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// POST /rounds/:round_id/submissions
pub async fn submit_track(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoundPath>,
    ValidatedJson(request): ValidatedJson<SubmitTrackRequest>,
) -> ApiResult<Created<Json<SubmissionResponse>>> {
    let submission = SubmissionService::new(state.service_context())
        .submit(path.round_id()?, auth.user_id, request)
        .await?;
    Ok(Created(Json(submission)))
}

/// GET /rounds/:round_id/submissions
pub async fn list_submissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoundPath>,
) -> ApiResult<Json<Vec<SubmissionResponse>>> {
    let submissions = SubmissionService::new(state.service_context())
        .list_submissions(path.round_id()?, auth.user_id)
        .await?;
    Ok(Json(submissions))
}

/// Cast or replace the caller's vote
///
/// PUT /submissions/:submission_id/vote
pub async fn cast_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<SubmissionPath>,
    ValidatedJson(request): ValidatedJson<CastVoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let vote = VoteService::new(state.service_context())
        .cast_vote(path.submission_id()?, auth.user_id, request)
        .await?;
    Ok(Json(vote))
}

/// DELETE /submissions/:submission_id/vote
pub async fn retract_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<SubmissionPath>,
) -> ApiResult<NoContent> {
    VoteService::new(state.service_context())
        .retract_vote(path.submission_id()?, auth.user_id)
        .await?;
    Ok(NoContent)
}

/// PUT /submissions/:submission_id/reactions/:emoji
pub async fn toggle_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ReactionPath>,
) -> ApiResult<Json<ReactionToggleResponse>> {
    let toggled = ReactionService::new(state.service_context())
        .toggle_reaction(path.submission_id()?, auth.user_id, &path.emoji)
        .await?;
    Ok(Json(toggled))
}

/// POST /submissions/:submission_id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<SubmissionPath>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<Created<Json<CommentResponse>>> {
    let comment = ReactionService::new(state.service_context())
        .add_comment(path.submission_id()?, auth.user_id, request)
        .await?;
    Ok(Created(Json(comment)))
}

/// GET /submissions/:submission_id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<SubmissionPath>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let comments = ReactionService::new(state.service_context())
        .list_comments(path.submission_id()?, auth.user_id)
        .await?;
    Ok(Json(comments))
}

/// DELETE /comments/:comment_id
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<CommentPath>,
) -> ApiResult<NoContent> {
    ReactionService::new(state.service_context())
        .delete_comment(path.comment_id()?, auth.user_id)
        .await?;
    Ok(NoContent)
}

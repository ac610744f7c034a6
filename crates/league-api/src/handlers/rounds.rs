//! Round handlers
//!
//! Creation, schedule edits and the manual lifecycle controls. Deadline
//! transitions happen in the scheduler, not here.

use axum::{
    extract::{Path, State},
    Json,
};
use league_service::dto::{
    AdvanceRoundRequest, CreateRoundRequest, RoundResponse, UpdateRoundRequest, VoteResponse,
};
use league_service::{RoundService, VoteService};

use crate::extractors::{AuthUser, LeaguePath, OptionalValidatedJson, RoundPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// POST /leagues/:league_id/rounds
pub async fn create_round(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
    ValidatedJson(request): ValidatedJson<CreateRoundRequest>,
) -> ApiResult<Created<Json<RoundResponse>>> {
    let round = RoundService::new(state.service_context())
        .create_round(path.league_id()?, auth.user_id, request)
        .await?;
    Ok(Created(Json(round)))
}

/// GET /leagues/:league_id/rounds
pub async fn list_rounds(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
) -> ApiResult<Json<Vec<RoundResponse>>> {
    let rounds = RoundService::new(state.service_context())
        .list_rounds(path.league_id()?, auth.user_id)
        .await?;
    Ok(Json(rounds))
}

/// GET /rounds/:round_id
pub async fn get_round(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoundPath>,
) -> ApiResult<Json<RoundResponse>> {
    let round = RoundService::new(state.service_context())
        .get_round(path.round_id()?, auth.user_id)
        .await?;
    Ok(Json(round))
}

/// Edit theme or schedule while the round is in draft or submitting
///
/// PATCH /rounds/:round_id
pub async fn update_round(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoundPath>,
    ValidatedJson(request): ValidatedJson<UpdateRoundRequest>,
) -> ApiResult<Json<RoundResponse>> {
    let round = RoundService::new(state.service_context())
        .update_round(path.round_id()?, auth.user_id, request)
        .await?;
    Ok(Json(round))
}

/// Move the round one step forward; an empty body means "the next state"
///
/// POST /rounds/:round_id/advance
pub async fn advance_round(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoundPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<AdvanceRoundRequest>,
) -> ApiResult<Json<RoundResponse>> {
    let round = RoundService::new(state.service_context())
        .advance_round(path.round_id()?, auth.user_id, request)
        .await?;
    Ok(Json(round))
}

/// Reopen submissions from voting; votes cast so far are discarded
///
/// POST /rounds/:round_id/revert
pub async fn revert_round(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoundPath>,
) -> ApiResult<Json<RoundResponse>> {
    let round = RoundService::new(state.service_context())
        .revert_round(path.round_id()?, auth.user_id)
        .await?;
    Ok(Json(round))
}

/// The caller's votes until reveal, every vote afterwards
///
/// GET /rounds/:round_id/votes
pub async fn list_votes(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoundPath>,
) -> ApiResult<Json<Vec<VoteResponse>>> {
    let votes = VoteService::new(state.service_context())
        .list_votes(path.round_id()?, auth.user_id)
        .await?;
    Ok(Json(votes))
}

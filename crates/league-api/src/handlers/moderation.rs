//! Moderation handlers
//!
//! Kick, ban, unban, role changes and the audit log. Reasons are optional,
//! so request bodies may be omitted.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use league_service::dto::{
    BanResponse, ChangeRoleRequest, LimitQuery, MemberResponse, ModerationLogResponse,
    ModerationRequest,
};
use league_service::ModerationService;

use crate::extractors::{
    AuthUser, LeaguePath, LeagueUserPath, OptionalValidatedJson, ValidatedJson,
};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// DELETE /leagues/:league_id/members/:user_id
pub async fn kick_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeagueUserPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<ModerationRequest>,
) -> ApiResult<NoContent> {
    let (league_id, target_id) = path.ids()?;
    ModerationService::new(state.service_context())
        .kick(league_id, auth.user_id, target_id, request)
        .await?;
    Ok(NoContent)
}

/// PUT /leagues/:league_id/bans/:user_id
pub async fn ban_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeagueUserPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<ModerationRequest>,
) -> ApiResult<NoContent> {
    let (league_id, target_id) = path.ids()?;
    ModerationService::new(state.service_context())
        .ban(league_id, auth.user_id, target_id, request)
        .await?;
    Ok(NoContent)
}

/// DELETE /leagues/:league_id/bans/:user_id
pub async fn unban_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeagueUserPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<ModerationRequest>,
) -> ApiResult<NoContent> {
    let (league_id, target_id) = path.ids()?;
    ModerationService::new(state.service_context())
        .unban(league_id, auth.user_id, target_id, request)
        .await?;
    Ok(NoContent)
}

/// GET /leagues/:league_id/bans
pub async fn list_bans(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
) -> ApiResult<Json<Vec<BanResponse>>> {
    let bans = ModerationService::new(state.service_context())
        .list_bans(path.league_id()?, auth.user_id)
        .await?;
    Ok(Json(bans))
}

/// PATCH /leagues/:league_id/members/:user_id/role
pub async fn change_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeagueUserPath>,
    ValidatedJson(request): ValidatedJson<ChangeRoleRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let (league_id, target_id) = path.ids()?;
    let member = ModerationService::new(state.service_context())
        .change_role(league_id, auth.user_id, target_id, request)
        .await?;
    Ok(Json(member))
}

/// GET /leagues/:league_id/moderation-log?limit=
pub async fn moderation_log(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<ModerationLogResponse>>> {
    let entries = ModerationService::new(state.service_context())
        .moderation_log(path.league_id()?, auth.user_id, query.limit)
        .await?;
    Ok(Json(entries))
}

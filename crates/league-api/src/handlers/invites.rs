//! Invite handlers
//!
//! Creation and listing are scoped to a league; preview, redeem and revoke
//! address the invite directly by code or link token.

use axum::{
    extract::{Path, State},
    Json,
};
use league_service::dto::{
    CreateInviteRequest, InvitePreviewResponse, InviteResponse, RedeemInviteResponse,
};
use league_service::InviteService;

use crate::extractors::{AuthUser, InvitePath, LeaguePath, OptionalValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Create an invite (owner or admin); the body is optional
///
/// POST /leagues/:league_id/invites
pub async fn create_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
    OptionalValidatedJson(request): OptionalValidatedJson<CreateInviteRequest>,
) -> ApiResult<Created<Json<InviteResponse>>> {
    let invite = InviteService::new(state.service_context())
        .create_invite(path.league_id()?, auth.user_id, request)
        .await?;
    Ok(Created(Json(invite)))
}

/// GET /leagues/:league_id/invites
pub async fn list_invites(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
) -> ApiResult<Json<Vec<InviteResponse>>> {
    let invites = InviteService::new(state.service_context())
        .list_invites(path.league_id()?, auth.user_id)
        .await?;
    Ok(Json(invites))
}

/// Public preview (no auth required)
///
/// GET /invites/:handle
pub async fn preview_invite(
    State(state): State<AppState>,
    Path(path): Path<InvitePath>,
) -> ApiResult<Json<InvitePreviewResponse>> {
    let preview = InviteService::new(state.service_context())
        .preview(&path.handle)
        .await?;
    Ok(Json(preview))
}

/// Join the invite's league
///
/// POST /invites/:handle
pub async fn redeem_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<InvitePath>,
) -> ApiResult<Json<RedeemInviteResponse>> {
    let joined = InviteService::new(state.service_context())
        .redeem(&path.handle, auth.user_id)
        .await?;
    Ok(Json(joined))
}

/// DELETE /invites/:handle
pub async fn revoke_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<InvitePath>,
) -> ApiResult<NoContent> {
    InviteService::new(state.service_context())
        .revoke_invite(&path.handle, auth.user_id)
        .await?;
    Ok(NoContent)
}

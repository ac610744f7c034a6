//! League handlers
//!
//! League creation, lookup, member listing and seasons.

use axum::{
    extract::{Path, State},
    Json,
};
use league_service::dto::{
    CreateLeagueRequest, CreateSeasonRequest, LeagueResponse, MemberResponse, SeasonResponse,
};
use league_service::LeagueService;

use crate::extractors::{AuthUser, LeaguePath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create a league; the caller becomes its owner
///
/// POST /leagues
pub async fn create_league(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateLeagueRequest>,
) -> ApiResult<Created<Json<LeagueResponse>>> {
    let league = LeagueService::new(state.service_context())
        .create_league(auth.user_id, request)
        .await?;
    Ok(Created(Json(league)))
}

/// Leagues the caller belongs to
///
/// GET /leagues/@me
pub async fn my_leagues(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<LeagueResponse>>> {
    let leagues = LeagueService::new(state.service_context())
        .list_my_leagues(auth.user_id)
        .await?;
    Ok(Json(leagues))
}

/// GET /leagues/:league_id
pub async fn get_league(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
) -> ApiResult<Json<LeagueResponse>> {
    let league = LeagueService::new(state.service_context())
        .get_league(path.league_id()?, auth.user_id)
        .await?;
    Ok(Json(league))
}

/// Active members
///
/// GET /leagues/:league_id/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let members = LeagueService::new(state.service_context())
        .list_members(path.league_id()?, auth.user_id)
        .await?;
    Ok(Json(members))
}

/// POST /leagues/:league_id/seasons
pub async fn create_season(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
    ValidatedJson(request): ValidatedJson<CreateSeasonRequest>,
) -> ApiResult<Created<Json<SeasonResponse>>> {
    let season = LeagueService::new(state.service_context())
        .create_season(path.league_id()?, auth.user_id, request)
        .await?;
    Ok(Created(Json(season)))
}

/// GET /leagues/:league_id/seasons
pub async fn list_seasons(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
) -> ApiResult<Json<Vec<SeasonResponse>>> {
    let seasons = LeagueService::new(state.service_context())
        .list_seasons(path.league_id()?, auth.user_id)
        .await?;
    Ok(Json(seasons))
}

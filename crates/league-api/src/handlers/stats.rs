//! Statistics handlers
//!
//! Leaderboards, per-member stats, head-to-head records, the controversial
//! listing and per-round standings. All of them are members-only.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use league_core::tally::{ControversialSubmission, HeadToHead, MemberStats};
use league_core::Snowflake;
use league_service::dto::{LeaderboardResponse, LimitQuery, RoundStandingsResponse, SeasonQuery};
use league_service::StatsService;

use crate::extractors::{AuthUser, HeadToHeadPath, LeaguePath, LeagueUserPath, RoundPath};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

fn season_filter(query: &SeasonQuery) -> ApiResult<Option<Snowflake>> {
    query
        .season_id
        .as_deref()
        .map(|raw| {
            raw.parse()
                .map_err(|_| ApiError::invalid_query("Invalid season_id format"))
        })
        .transpose()
}

/// GET /leagues/:league_id/leaderboard?season_id=
pub async fn leaderboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
    Query(query): Query<SeasonQuery>,
) -> ApiResult<Json<LeaderboardResponse>> {
    let board = StatsService::new(state.service_context())
        .leaderboard(path.league_id()?, auth.user_id, season_filter(&query)?)
        .await?;
    Ok(Json(board))
}

/// GET /leagues/:league_id/stats/:user_id?season_id=
pub async fn member_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeagueUserPath>,
    Query(query): Query<SeasonQuery>,
) -> ApiResult<Json<MemberStats>> {
    let (league_id, target_id) = path.ids()?;
    let stats = StatsService::new(state.service_context())
        .member_stats(league_id, auth.user_id, target_id, season_filter(&query)?)
        .await?;
    Ok(Json(stats))
}

/// GET /leagues/:league_id/head-to-head/:user_a/:user_b?season_id=
pub async fn head_to_head(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<HeadToHeadPath>,
    Query(query): Query<SeasonQuery>,
) -> ApiResult<Json<HeadToHead>> {
    let (league_id, user_a, user_b) = path.ids()?;
    let record = StatsService::new(state.service_context())
        .head_to_head(league_id, auth.user_id, user_a, user_b, season_filter(&query)?)
        .await?;
    Ok(Json(record))
}

/// GET /leagues/:league_id/controversial?limit=&season_id=
pub async fn controversial(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<LeaguePath>,
    Query(limit): Query<LimitQuery>,
    Query(query): Query<SeasonQuery>,
) -> ApiResult<Json<Vec<ControversialSubmission>>> {
    let listing = StatsService::new(state.service_context())
        .controversial(path.league_id()?, auth.user_id, limit.limit, season_filter(&query)?)
        .await?;
    Ok(Json(listing))
}

/// GET /rounds/:round_id/standings
pub async fn round_standings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<RoundPath>,
) -> ApiResult<Json<RoundStandingsResponse>> {
    let standings = StatsService::new(state.service_context())
        .round_standings(path.round_id()?, auth.user_id)
        .await?;
    Ok(Json(standings))
}

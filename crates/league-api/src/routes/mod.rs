//! Route definitions
//!
//! All API routes organized by resource and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{health, invites, leagues, moderation, rounds, stats, submissions};
use crate::state::AppState;

/// Create the main API router
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(league_routes())
        .merge(invite_routes())
        .merge(round_routes())
        .merge(submission_routes())
        .merge(moderation_routes())
}

/// Leagues, seasons, members and league-scoped statistics
fn league_routes() -> Router<AppState> {
    Router::new()
        .route("/leagues", post(leagues::create_league))
        .route("/leagues/@me", get(leagues::my_leagues))
        .route("/leagues/:league_id", get(leagues::get_league))
        .route("/leagues/:league_id/members", get(leagues::list_members))
        .route(
            "/leagues/:league_id/seasons",
            post(leagues::create_season).get(leagues::list_seasons),
        )
        .route(
            "/leagues/:league_id/invites",
            post(invites::create_invite).get(invites::list_invites),
        )
        .route(
            "/leagues/:league_id/rounds",
            post(rounds::create_round).get(rounds::list_rounds),
        )
        .route("/leagues/:league_id/leaderboard", get(stats::leaderboard))
        .route("/leagues/:league_id/stats/:user_id", get(stats::member_stats))
        .route(
            "/leagues/:league_id/head-to-head/:user_a/:user_b",
            get(stats::head_to_head),
        )
        .route("/leagues/:league_id/controversial", get(stats::controversial))
}

/// Invites addressed by code or link token
fn invite_routes() -> Router<AppState> {
    Router::new().route(
        "/invites/:handle",
        get(invites::preview_invite)
            .post(invites::redeem_invite)
            .delete(invites::revoke_invite),
    )
}

/// Round lifecycle, submissions and votes of a round
fn round_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rounds/:round_id",
            get(rounds::get_round).patch(rounds::update_round),
        )
        .route("/rounds/:round_id/advance", post(rounds::advance_round))
        .route("/rounds/:round_id/revert", post(rounds::revert_round))
        .route(
            "/rounds/:round_id/submissions",
            post(submissions::submit_track).get(submissions::list_submissions),
        )
        .route("/rounds/:round_id/votes", get(rounds::list_votes))
        .route("/rounds/:round_id/standings", get(stats::round_standings))
}

/// Votes, reactions and comments on a submission
fn submission_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/submissions/:submission_id/vote",
            put(submissions::cast_vote).delete(submissions::retract_vote),
        )
        .route(
            "/submissions/:submission_id/reactions/:emoji",
            put(submissions::toggle_reaction),
        )
        .route(
            "/submissions/:submission_id/comments",
            post(submissions::add_comment).get(submissions::list_comments),
        )
        .route("/comments/:comment_id", delete(submissions::delete_comment))
}

/// Kick, ban, role changes and the audit log
fn moderation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/leagues/:league_id/members/:user_id",
            delete(moderation::kick_member),
        )
        .route(
            "/leagues/:league_id/members/:user_id/role",
            patch(moderation::change_role),
        )
        .route("/leagues/:league_id/bans", get(moderation::list_bans))
        .route(
            "/leagues/:league_id/bans/:user_id",
            put(moderation::ban_member).delete(moderation::unban_member),
        )
        .route(
            "/leagues/:league_id/moderation-log",
            get(moderation::moderation_log),
        )
}

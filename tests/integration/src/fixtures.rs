//! Test fixtures and data generators
//!
//! Request bodies the tests send and the subset of response fields they
//! read back. Ids stay strings, exactly as they travel over the wire.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Create league request
#[derive(Debug, Serialize)]
pub struct CreateLeagueRequest {
    pub name: String,
    pub scoring_mode: String,
}

impl CreateLeagueRequest {
    pub fn points(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scoring_mode: "points".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LeagueResponse {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub member_count: Option<i64>,
    pub my_role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteResponse {
    pub code: String,
    pub link_token: String,
    pub uses: i32,
    pub max_uses: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct InvitePreviewResponse {
    pub league_name: String,
    pub member_count: i64,
    pub usable: bool,
    pub remaining_uses: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RedeemInviteResponse {
    pub league: LeagueResponse,
    pub member: MemberResponse,
}

/// A round opened for submissions straight away, with no deadlines
pub fn open_round(theme: &str) -> Value {
    json!({ "theme": theme, "open": true })
}

#[derive(Debug, Deserialize)]
pub struct RoundResponse {
    pub id: String,
    pub status: String,
    pub allowed_actions: Vec<String>,
}

pub fn track(title: &str, artist: &str) -> Value {
    json!({ "title": title, "artist": artist, "genre": "indie" })
}

#[derive(Debug, Deserialize)]
pub struct SubmissionResponse {
    pub id: String,
    pub user_id: Option<String>,
    pub title: String,
    pub is_mine: bool,
}

pub fn points(points: i32) -> Value {
    json!({ "kind": "points", "points": points })
}

#[derive(Debug, Deserialize)]
pub struct StandingResponse {
    pub placement: u32,
    pub user_id: String,
    pub score: i64,
}

#[derive(Debug, Deserialize)]
pub struct RoundStandingsResponse {
    pub status: String,
    pub standings: Vec<StandingResponse>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub user_id: String,
    pub total_points: i64,
    pub wins: u32,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardResponse {
    pub rows: Vec<LeaderboardRow>,
}

#[derive(Debug, Deserialize)]
pub struct ModerationLogEntry {
    pub target_id: String,
    pub action: String,
}

/// Error response envelope
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

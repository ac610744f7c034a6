//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use league_core::entities::{LeagueSettings, RoundSchedule, Track};
use league_core::tally::LeaderboardRow;
use league_core::{MemberRole, ModerationAction, RoundStatus, Snowflake, Visibility, VoteValue};

// ============================================================================
// Health
// ============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
}

// ============================================================================
// League Responses
// ============================================================================

/// League response
#[derive(Debug, Clone, Serialize)]
pub struct LeagueResponse {
    pub id: Snowflake,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub visibility: Visibility,
    pub owner_id: Snowflake,
    pub settings: LeagueSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_count: Option<i64>,
    /// Caller's role, when the caller is a member
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_role: Option<MemberRole>,
    pub created_at: DateTime<Utc>,
}

/// Active member response
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub league_id: Snowflake,
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

/// Outstanding ban response
#[derive(Debug, Clone, Serialize)]
pub struct BanResponse {
    pub user_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub banned_at: Option<DateTime<Utc>>,
}

/// Season response
#[derive(Debug, Clone, Serialize)]
pub struct SeasonResponse {
    pub id: Snowflake,
    pub league_id: Snowflake,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Invite Responses
// ============================================================================

/// Full invite, shown to league managers
#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub code: String,
    pub link_token: String,
    pub league_id: Snowflake,
    pub created_by: Snowflake,
    pub uses: i32,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Public invite preview, no authentication required
#[derive(Debug, Clone, Serialize)]
pub struct InvitePreviewResponse {
    pub league_id: Snowflake,
    pub league_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub league_description: Option<String>,
    pub member_count: i64,
    pub usable: bool,
    pub expires_at: Option<DateTime<Utc>>,
    /// None means unlimited
    pub remaining_uses: Option<i32>,
}

/// Result of a successful redemption
#[derive(Debug, Clone, Serialize)]
pub struct RedeemInviteResponse {
    pub league: LeagueResponse,
    pub member: MemberResponse,
}

// ============================================================================
// Round Responses
// ============================================================================

/// Round response
#[derive(Debug, Clone, Serialize)]
pub struct RoundResponse {
    pub id: Snowflake,
    pub league_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<Snowflake>,
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: RoundStatus,
    #[serde(flatten)]
    pub schedule: RoundSchedule,
    /// Writes the current phase permits
    pub allowed_actions: Vec<&'static str>,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission response; `user_id` is hidden from other members until reveal
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    pub id: Snowflake,
    pub round_id: Snowflake,
    pub user_id: Option<Snowflake>,
    #[serde(flatten)]
    pub track: Track,
    pub submitted_at: DateTime<Utc>,
    pub is_mine: bool,
    pub reactions: Vec<ReactionCountResponse>,
}

/// Per-emoji reaction count
#[derive(Debug, Clone, Serialize)]
pub struct ReactionCountResponse {
    pub emoji: String,
    pub count: i64,
    pub me: bool,
}

/// Stored ballot
#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub id: Snowflake,
    pub round_id: Snowflake,
    pub submission_id: Snowflake,
    pub voter_id: Snowflake,
    #[serde(flatten)]
    pub value: VoteValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a reaction toggle
#[derive(Debug, Clone, Serialize)]
pub struct ReactionToggleResponse {
    pub submission_id: Snowflake,
    pub emoji: String,
    pub reacted: bool,
}

/// Comment response
#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub id: Snowflake,
    pub round_id: Snowflake,
    pub submission_id: Snowflake,
    pub author_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Results
// ============================================================================

/// One ranked submission of a revealed round
#[derive(Debug, Clone, Serialize)]
pub struct StandingResponse {
    pub placement: u32,
    pub submission_id: Snowflake,
    pub user_id: Snowflake,
    pub title: String,
    pub artist: String,
    pub score: i64,
    pub upvotes: u32,
    pub downvotes: u32,
    pub vote_count: u32,
}

/// Standings of a revealed round
#[derive(Debug, Clone, Serialize)]
pub struct RoundStandingsResponse {
    pub round_id: Snowflake,
    pub status: RoundStatus,
    pub standings: Vec<StandingResponse>,
}

/// League or season leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub league_id: Snowflake,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_id: Option<Snowflake>,
    pub rows: Vec<LeaderboardRow>,
}

// ============================================================================
// Moderation
// ============================================================================

/// Audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct ModerationLogResponse {
    pub id: Snowflake,
    pub performer_id: Snowflake,
    pub target_id: Snowflake,
    pub action: ModerationAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

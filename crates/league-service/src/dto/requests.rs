//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and, where they carry free-form
//! input, `Validate`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use league_core::entities::RoundSchedule;
use league_core::{EmptyRoundPolicy, MemberRole, RoundStatus, ScoringMode, Visibility, VoteValue};

// ============================================================================
// League Requests
// ============================================================================

/// Create league request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLeagueRequest {
    #[validate(length(min = 1, max = 100, message = "League name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub scoring_mode: ScoringMode,

    #[serde(default)]
    pub allow_multiple_submissions: bool,

    #[validate(range(min = 1, max = 100, message = "Max points per vote must be 1-100"))]
    pub max_points_per_vote: Option<i32>,

    /// `{"policy": "hold"}` or `{"policy": "extend", "seconds": 86400}`
    #[serde(default)]
    pub empty_round_policy: EmptyRoundPolicy,
}

/// Create season request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSeasonRequest {
    #[validate(length(min = 1, max = 100, message = "Season name must be 1-100 characters"))]
    pub name: String,
}

// ============================================================================
// Invite Requests
// ============================================================================

/// Create invite request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// Seconds until the invite expires; absent means never
    #[validate(range(min = 60, max = 2_592_000, message = "Max age must be 60s to 30 days"))]
    pub max_age: Option<i64>,

    /// Maximum redemptions; absent means unlimited
    #[validate(range(min = 1, max = 10_000, message = "Max uses must be 1-10000"))]
    pub max_uses: Option<i32>,
}

// ============================================================================
// Round Requests
// ============================================================================

/// Phase deadlines; each one is optional
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ScheduleRequest {
    pub submission_start: Option<DateTime<Utc>>,
    pub submission_end: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
}

impl From<ScheduleRequest> for RoundSchedule {
    fn from(req: ScheduleRequest) -> Self {
        Self {
            submission_start: req.submission_start,
            submission_end: req.submission_end,
            voting_start: req.voting_start,
            voting_end: req.voting_end,
        }
    }
}

/// Create round request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoundRequest {
    #[validate(length(min = 1, max = 200, message = "Theme must be 1-200 characters"))]
    pub theme: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Season ID (Snowflake as string)
    pub season_id: Option<String>,

    #[serde(default)]
    pub schedule: ScheduleRequest,

    /// Open submissions immediately instead of staying in draft
    #[serde(default)]
    pub open: bool,
}

/// Update round request; absent fields stay unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRoundRequest {
    #[validate(length(min = 1, max = 200, message = "Theme must be 1-200 characters"))]
    pub theme: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Season ID (Snowflake as string)
    pub season_id: Option<String>,

    /// Replaces the whole schedule when present
    pub schedule: Option<ScheduleRequest>,
}

/// Manual advance; without a target the round moves to its next phase
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct AdvanceRoundRequest {
    pub to: Option<RoundStatus>,
}

// ============================================================================
// Submission & Vote Requests
// ============================================================================

/// Submit track request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitTrackRequest {
    #[validate(length(min = 1, max = 300, message = "Title must be 1-300 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 300, message = "Artist must be 1-300 characters"))]
    pub artist: String,

    #[validate(length(max = 300, message = "Album must be at most 300 characters"))]
    pub album: Option<String>,

    /// Streaming-service track id
    #[validate(length(max = 200, message = "External id must be at most 200 characters"))]
    pub external_id: Option<String>,

    #[validate(length(max = 100, message = "Genre must be at most 100 characters"))]
    pub genre: Option<String>,
}

/// Cast vote request: `{"kind": "points", "points": 3}`, `{"kind": "up"}`
/// or `{"kind": "down"}`
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct CastVoteRequest {
    #[serde(flatten)]
    pub value: VoteValue,
}

/// Create comment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub content: String,
}

// ============================================================================
// Moderation Requests
// ============================================================================

/// Kick or ban request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ModerationRequest {
    #[validate(length(max = 512, message = "Reason must be at most 512 characters"))]
    pub reason: Option<String>,
}

/// Change role request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    pub role: MemberRole,

    #[validate(length(max = 512, message = "Reason must be at most 512 characters"))]
    pub reason: Option<String>,
}

// ============================================================================
// Query Parameters
// ============================================================================

/// `?season_id=` filter for leaderboards and stats
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonQuery {
    pub season_id: Option<String>,
}

/// `?limit=` for bounded listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_league_defaults() {
        let req: CreateLeagueRequest = serde_json::from_str(r#"{"name": "Friday Tunes"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.visibility, Visibility::Private);
        assert_eq!(req.scoring_mode, ScoringMode::Points);
        assert_eq!(req.empty_round_policy, EmptyRoundPolicy::Hold);
        assert!(req.max_points_per_vote.is_none());
    }

    #[test]
    fn test_create_league_validation() {
        let req: CreateLeagueRequest =
            serde_json::from_str(r#"{"name": "", "max_points_per_vote": 0}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("max_points_per_vote"));
    }

    #[test]
    fn test_extend_policy_parses() {
        let req: CreateLeagueRequest = serde_json::from_str(
            r#"{"name": "x", "empty_round_policy": {"policy": "extend", "seconds": 3600}}"#,
        )
        .unwrap();
        assert_eq!(
            req.empty_round_policy,
            EmptyRoundPolicy::Extend { seconds: 3600 }
        );
    }

    #[test]
    fn test_cast_vote_shapes() {
        let points: CastVoteRequest =
            serde_json::from_str(r#"{"kind": "points", "points": 3}"#).unwrap();
        assert_eq!(points.value, VoteValue::Points { points: 3 });

        let down: CastVoteRequest = serde_json::from_str(r#"{"kind": "down"}"#).unwrap();
        assert_eq!(down.value, VoteValue::Down);

        assert!(serde_json::from_str::<CastVoteRequest>(r#"{"kind": "meh"}"#).is_err());
    }

    #[test]
    fn test_comment_length() {
        let req = CreateCommentRequest {
            content: "x".repeat(2001),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_advance_target_parses() {
        let req: AdvanceRoundRequest = serde_json::from_str(r#"{"to": "voting"}"#).unwrap();
        assert_eq!(req.to, Some(RoundStatus::Voting));
        let empty: AdvanceRoundRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.to.is_none());
    }
}

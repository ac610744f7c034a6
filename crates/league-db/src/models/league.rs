//! League and season database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for leagues table
///
/// Settings are flattened into columns; the empty round policy is split
/// into its tag and the optional extension length.
#[derive(Debug, Clone, FromRow)]
pub struct LeagueModel {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub visibility: String,
    pub owner_id: i64,
    pub scoring_mode: String,
    pub allow_multiple_submissions: bool,
    pub max_points_per_vote: i32,
    pub empty_round_policy: String,
    pub empty_round_extend_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Database model for seasons table
#[derive(Debug, Clone, FromRow)]
pub struct SeasonModel {
    pub id: i64,
    pub league_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

//! Round database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for rounds table
#[derive(Debug, Clone, FromRow)]
pub struct RoundModel {
    pub id: i64,
    pub league_id: i64,
    pub season_id: Option<i64>,
    pub theme: String,
    pub description: Option<String>,
    /// 'draft', 'submitting', 'voting', 'revealed' or 'archived'
    pub status: String,
    pub submission_start: Option<DateTime<Utc>>,
    pub submission_end: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

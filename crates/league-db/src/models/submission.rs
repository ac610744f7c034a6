//! Submission database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for submissions table; track fields are inlined
#[derive(Debug, Clone, FromRow)]
pub struct SubmissionModel {
    pub id: i64,
    pub round_id: i64,
    pub league_id: i64,
    pub user_id: i64,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub external_id: Option<String>,
    pub genre: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

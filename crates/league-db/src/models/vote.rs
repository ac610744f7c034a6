//! Vote, reaction and comment database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for votes table
#[derive(Debug, Clone, FromRow)]
pub struct VoteModel {
    pub id: i64,
    pub round_id: i64,
    pub submission_id: i64,
    pub voter_id: i64,
    /// 'points', 'up' or 'down'
    pub kind: String,
    /// Set only for 'points' ballots
    pub points: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub submission_id: i64,
    pub user_id: i64,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for comments table
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: i64,
    pub round_id: i64,
    pub submission_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

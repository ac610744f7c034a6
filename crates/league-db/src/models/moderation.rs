//! Moderation log database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for moderation_log table
#[derive(Debug, Clone, FromRow)]
pub struct ModerationLogModel {
    pub id: i64,
    pub league_id: i64,
    pub performer_id: i64,
    pub target_id: i64,
    pub action: String,
    pub reason: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

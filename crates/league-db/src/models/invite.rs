//! Invite database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for invites table
#[derive(Debug, Clone, FromRow)]
pub struct InviteModel {
    pub code: String,
    pub link_token: String,
    pub league_id: i64,
    pub created_by: i64,
    pub uses: i32,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

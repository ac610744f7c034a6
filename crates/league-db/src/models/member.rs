//! League member database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for league_members table
#[derive(Debug, Clone, FromRow)]
pub struct LeagueMemberModel {
    pub id: i64,
    pub league_id: i64,
    pub user_id: i64,
    /// 'owner', 'admin' or 'member'
    pub role: String,
    pub joined_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
    pub banned_at: Option<DateTime<Utc>>,
    pub ban_reason: Option<String>,
    pub ban_lifted_at: Option<DateTime<Utc>>,
}

impl LeagueMemberModel {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.removed_at.is_none() && self.banned_at.is_none()
    }
}

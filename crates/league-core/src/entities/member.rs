//! Member entity - one row per stint of a user in a league
//!
//! Rows are never deleted. A kick stamps `removed_at`, a ban stamps
//! `banned_at`, and lifting the ban stamps `ban_lifted_at`. A user who comes
//! back gets a fresh row, so the history of earlier stints survives.

use chrono::{DateTime, Utc};

use crate::value_objects::{MemberRole, Snowflake};

/// League membership row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueMember {
    pub id: Snowflake,
    pub league_id: Snowflake,
    pub user_id: Snowflake,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
    pub banned_at: Option<DateTime<Utc>>,
    pub ban_reason: Option<String>,
    pub ban_lifted_at: Option<DateTime<Utc>>,
}

impl LeagueMember {
    pub fn new(
        id: Snowflake,
        league_id: Snowflake,
        user_id: Snowflake,
        role: MemberRole,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            league_id,
            user_id,
            role,
            joined_at: now,
            removed_at: None,
            banned_at: None,
            ban_reason: None,
            ban_lifted_at: None,
        }
    }

    /// Placeholder row recording a ban against someone who never joined
    pub fn banned_outsider(
        id: Snowflake,
        league_id: Snowflake,
        user_id: Snowflake,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut row = Self::new(id, league_id, user_id, MemberRole::Member, now);
        row.ban(reason, now);
        row
    }

    /// Counts toward membership: neither kicked nor banned
    #[inline]
    pub fn is_active(&self) -> bool {
        self.removed_at.is_none() && self.banned_at.is_none()
    }

    /// Ban on this row is still in force
    #[inline]
    pub fn is_banned(&self) -> bool {
        self.banned_at.is_some() && self.ban_lifted_at.is_none()
    }

    pub fn ban(&mut self, reason: Option<String>, now: DateTime<Utc>) {
        self.banned_at = Some(now);
        self.ban_reason = reason;
    }

    pub fn lift_ban(&mut self, now: DateTime<Utc>) {
        self.ban_lifted_at = Some(now);
    }

    pub fn remove(&mut self, now: DateTime<Utc>) {
        self.removed_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member() -> LeagueMember {
        LeagueMember::new(
            Snowflake::new(1),
            Snowflake::new(10),
            Snowflake::new(100),
            MemberRole::Member,
            Utc::now(),
        )
    }

    #[test]
    fn test_new_member_is_active() {
        let m = member();
        assert!(m.is_active());
        assert!(!m.is_banned());
    }

    #[test]
    fn test_ban_lifecycle() {
        let mut m = member();
        m.ban(Some("spam".to_string()), Utc::now());
        assert!(!m.is_active());
        assert!(m.is_banned());

        m.lift_ban(Utc::now());
        assert!(!m.is_banned());
        // lifting a ban does not restore membership
        assert!(!m.is_active());
    }

    #[test]
    fn test_kick_keeps_row_inactive() {
        let mut m = member();
        m.remove(Utc::now());
        assert!(!m.is_active());
        assert!(!m.is_banned());
    }

    #[test]
    fn test_banned_outsider() {
        let row = LeagueMember::banned_outsider(
            Snowflake::new(2),
            Snowflake::new(10),
            Snowflake::new(200),
            None,
            Utc::now(),
        );
        assert!(row.is_banned());
        assert!(!row.is_active());
    }
}

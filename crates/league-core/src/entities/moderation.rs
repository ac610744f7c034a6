//! Moderation log - append-only audit of membership actions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{MemberRole, Snowflake};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Kick,
    Ban,
    Unban,
    RoleChange,
}

impl ModerationAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::RoleChange => "role_change",
        }
    }
}

impl FromStr for ModerationAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kick" => Ok(Self::Kick),
            "ban" => Ok(Self::Ban),
            "unban" => Ok(Self::Unban),
            "role_change" => Ok(Self::RoleChange),
            other => Err(DomainError::ValidationError(format!(
                "unknown moderation action: {other}"
            ))),
        }
    }
}

/// Audit entry; written in the same transaction as its effect
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationLogEntry {
    pub id: Snowflake,
    pub league_id: Snowflake,
    pub performer_id: Snowflake,
    pub target_id: Snowflake,
    pub action: ModerationAction,
    pub reason: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Membership mutation paired with its audit entry.
///
/// `expected_role` is the target's role as seen when the request was
/// authorized; the store rejects the effect with a conflict if the active
/// row no longer matches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationEffect {
    Kick {
        league_id: Snowflake,
        user_id: Snowflake,
        expected_role: MemberRole,
    },
    Ban {
        league_id: Snowflake,
        user_id: Snowflake,
        expected_role: Option<MemberRole>,
        /// Row id used when the target holds no active membership
        placeholder_id: Snowflake,
        reason: Option<String>,
    },
    Unban {
        league_id: Snowflake,
        user_id: Snowflake,
    },
    ChangeRole {
        league_id: Snowflake,
        user_id: Snowflake,
        from: MemberRole,
        to: MemberRole,
    },
}

impl ModerationEffect {
    pub fn action(&self) -> ModerationAction {
        match self {
            Self::Kick { .. } => ModerationAction::Kick,
            Self::Ban { .. } => ModerationAction::Ban,
            Self::Unban { .. } => ModerationAction::Unban,
            Self::ChangeRole { .. } => ModerationAction::RoleChange,
        }
    }

    pub fn target(&self) -> (Snowflake, Snowflake) {
        match self {
            Self::Kick {
                league_id, user_id, ..
            }
            | Self::Ban {
                league_id, user_id, ..
            }
            | Self::Unban { league_id, user_id }
            | Self::ChangeRole {
                league_id, user_id, ..
            } => (*league_id, *user_id),
        }
    }

    /// Structured details stored alongside the audit entry
    pub fn metadata(&self) -> Option<serde_json::Value> {
        match self {
            Self::ChangeRole { from, to, .. } => Some(serde_json::json!({
                "old_role": from.as_str(),
                "new_role": to.as_str(),
            })),
            Self::Kick { expected_role, .. } => Some(serde_json::json!({
                "role": expected_role.as_str(),
            })),
            Self::Ban { .. } | Self::Unban { .. } => None,
        }
    }

    /// Build the audit entry that must accompany this effect
    pub fn log_entry(
        &self,
        id: Snowflake,
        performer_id: Snowflake,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> ModerationLogEntry {
        let (league_id, target_id) = self.target();
        ModerationLogEntry {
            id,
            league_id,
            performer_id,
            target_id,
            action: self.action(),
            reason,
            metadata: self.metadata(),
            created_at: now,
        }
    }
}

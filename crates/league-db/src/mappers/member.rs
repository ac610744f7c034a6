//! League member entity <-> model mapper

use league_core::entities::LeagueMember;
use league_core::error::DomainError;
use league_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::LeagueMemberModel;

impl TryFrom<LeagueMemberModel> for LeagueMember {
    type Error = DomainError;

    fn try_from(model: LeagueMemberModel) -> Result<Self, Self::Error> {
        Ok(LeagueMember {
            id: Snowflake::new(model.id),
            league_id: Snowflake::new(model.league_id),
            user_id: Snowflake::new(model.user_id),
            role: parse_column("role", &model.role)?,
            joined_at: model.joined_at,
            removed_at: model.removed_at,
            banned_at: model.banned_at,
            ban_reason: model.ban_reason,
            ban_lifted_at: model.ban_lifted_at,
        })
    }
}

//! Moderation log entity <-> model mapper

use league_core::entities::ModerationLogEntry;
use league_core::error::DomainError;
use league_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::ModerationLogModel;

impl TryFrom<ModerationLogModel> for ModerationLogEntry {
    type Error = DomainError;

    fn try_from(model: ModerationLogModel) -> Result<Self, Self::Error> {
        Ok(ModerationLogEntry {
            id: Snowflake::new(model.id),
            league_id: Snowflake::new(model.league_id),
            performer_id: Snowflake::new(model.performer_id),
            target_id: Snowflake::new(model.target_id),
            action: parse_column("action", &model.action)?,
            reason: model.reason,
            metadata: model.metadata,
            created_at: model.created_at,
        })
    }
}

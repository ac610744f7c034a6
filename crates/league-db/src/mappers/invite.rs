//! Invite entity <-> model mapper

use league_core::entities::Invite;
use league_core::value_objects::Snowflake;

use crate::models::InviteModel;

impl From<InviteModel> for Invite {
    fn from(model: InviteModel) -> Self {
        Invite {
            code: model.code,
            link_token: model.link_token,
            league_id: Snowflake::new(model.league_id),
            created_by: Snowflake::new(model.created_by),
            uses: model.uses,
            max_uses: model.max_uses,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}

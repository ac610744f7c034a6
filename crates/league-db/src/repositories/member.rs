//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use league_core::entities::LeagueMember;
use league_core::traits::{MemberRepository, RepoResult};
use league_core::value_objects::Snowflake;

use crate::mappers::convert_all;
use crate::models::LeagueMemberModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find_active(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<LeagueMember>> {
        let result = sqlx::query_as::<_, LeagueMemberModel>(
            r#"
            SELECT id, league_id, user_id, role, joined_at, removed_at,
                   banned_at, ban_reason, ban_lifted_at
            FROM league_members
            WHERE league_id = $1 AND user_id = $2
              AND removed_at IS NULL AND banned_at IS NULL
            "#,
        )
        .bind(league_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(LeagueMember::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_active_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<LeagueMember>> {
        let results = sqlx::query_as::<_, LeagueMemberModel>(
            r#"
            SELECT id, league_id, user_id, role, joined_at, removed_at,
                   banned_at, ban_reason, ban_lifted_at
            FROM league_members
            WHERE league_id = $1 AND removed_at IS NULL AND banned_at IS NULL
            ORDER BY joined_at ASC, id ASC
            "#,
        )
        .bind(league_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self))]
    async fn find_active_ban(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<LeagueMember>> {
        let result = sqlx::query_as::<_, LeagueMemberModel>(
            r#"
            SELECT id, league_id, user_id, role, joined_at, removed_at,
                   banned_at, ban_reason, ban_lifted_at
            FROM league_members
            WHERE league_id = $1 AND user_id = $2
              AND banned_at IS NOT NULL AND ban_lifted_at IS NULL
            "#,
        )
        .bind(league_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(LeagueMember::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_bans(&self, league_id: Snowflake) -> RepoResult<Vec<LeagueMember>> {
        let results = sqlx::query_as::<_, LeagueMemberModel>(
            r#"
            SELECT id, league_id, user_id, role, joined_at, removed_at,
                   banned_at, ban_reason, ban_lifted_at
            FROM league_members
            WHERE league_id = $1 AND banned_at IS NOT NULL AND ban_lifted_at IS NULL
            ORDER BY banned_at DESC
            "#,
        )
        .bind(league_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self))]
    async fn find_history(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<LeagueMember>> {
        let results = sqlx::query_as::<_, LeagueMemberModel>(
            r#"
            SELECT id, league_id, user_id, role, joined_at, removed_at,
                   banned_at, ban_reason, ban_lifted_at
            FROM league_members
            WHERE league_id = $1 AND user_id = $2
            ORDER BY joined_at ASC, id ASC
            "#,
        )
        .bind(league_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }
}

//! PostgreSQL implementation of LeagueRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use league_core::entities::{League, LeagueMember};
use league_core::error::DomainError;
use league_core::traits::{LeagueRepository, RepoResult};
use league_core::value_objects::Snowflake;

use crate::mappers::{convert_all, LeagueInsert};
use crate::models::LeagueModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of LeagueRepository
#[derive(Clone)]
pub struct PgLeagueRepository {
    pool: PgPool,
}

impl PgLeagueRepository {
    /// Create a new PgLeagueRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeagueRepository for PgLeagueRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<League>> {
        let result = sqlx::query_as::<_, LeagueModel>(
            r#"
            SELECT id, name, description, visibility, owner_id, scoring_mode,
                   allow_multiple_submissions, max_points_per_vote,
                   empty_round_policy, empty_round_extend_secs, created_at
            FROM leagues
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(League::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<League>> {
        let results = sqlx::query_as::<_, LeagueModel>(
            r#"
            SELECT l.id, l.name, l.description, l.visibility, l.owner_id, l.scoring_mode,
                   l.allow_multiple_submissions, l.max_points_per_vote,
                   l.empty_round_policy, l.empty_round_extend_secs, l.created_at
            FROM leagues l
            INNER JOIN league_members m ON m.league_id = l.id
            WHERE m.user_id = $1 AND m.removed_at IS NULL AND m.banned_at IS NULL
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self, league, owner), fields(league_id = %league.id))]
    async fn create_with_owner(&self, league: &League, owner: &LeagueMember) -> RepoResult<()> {
        let insert = LeagueInsert::new(league);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO leagues (id, name, description, visibility, owner_id, scoring_mode,
                                 allow_multiple_submissions, max_points_per_vote,
                                 empty_round_policy, empty_round_extend_secs, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(insert.id)
        .bind(insert.name)
        .bind(insert.description)
        .bind(insert.visibility)
        .bind(insert.owner_id)
        .bind(insert.scoring_mode)
        .bind(insert.allow_multiple_submissions)
        .bind(insert.max_points_per_vote)
        .bind(insert.empty_round_policy)
        .bind(insert.empty_round_extend_secs)
        .bind(league.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateEntry("league".into())))?;

        sqlx::query(
            r#"
            INSERT INTO league_members (id, league_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(owner.id.into_inner())
        .bind(owner.league_id.into_inner())
        .bind(owner.user_id.into_inner())
        .bind(owner.role.as_str())
        .bind(owner.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn member_count(&self, league_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM league_members
            WHERE league_id = $1 AND removed_at IS NULL AND banned_at IS NULL
            "#,
        )
        .bind(league_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgLeagueRepository>();
    }
}

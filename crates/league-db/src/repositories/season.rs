//! PostgreSQL implementation of SeasonRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use league_core::entities::Season;
use league_core::error::DomainError;
use league_core::traits::{RepoResult, SeasonRepository};
use league_core::value_objects::Snowflake;

use crate::models::SeasonModel;

use super::error::{league_not_found, map_db_error};

/// PostgreSQL implementation of SeasonRepository
#[derive(Clone)]
pub struct PgSeasonRepository {
    pool: PgPool,
}

impl PgSeasonRepository {
    /// Create a new PgSeasonRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeasonRepository for PgSeasonRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Season>> {
        let result = sqlx::query_as::<_, SeasonModel>(
            r#"
            SELECT id, league_id, name, created_at
            FROM seasons
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Season::from))
    }

    #[instrument(skip(self))]
    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Season>> {
        let results = sqlx::query_as::<_, SeasonModel>(
            r#"
            SELECT id, league_id, name, created_at
            FROM seasons
            WHERE league_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(league_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Season::from).collect())
    }

    #[instrument(skip(self, season), fields(season_id = %season.id))]
    async fn create(&self, season: &Season) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO seasons (id, league_id, name, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(season.id.into_inner())
        .bind(season.league_id.into_inner())
        .bind(&season.name)
        .bind(season.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|db| db.is_foreign_key_violation()) {
                league_not_found(season.league_id)
            } else if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                DomainError::DuplicateEntry("season".into())
            } else {
                map_db_error(e)
            }
        })?;

        Ok(())
    }
}

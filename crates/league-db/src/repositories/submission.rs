//! PostgreSQL implementation of SubmissionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use league_core::entities::Submission;
use league_core::error::DomainError;
use league_core::traits::{RepoResult, SubmissionRepository};
use league_core::value_objects::{RoundActions, RoundStatus, Snowflake};

use crate::mappers::{parse_column, SubmissionInsert};
use crate::models::SubmissionModel;

use super::error::{map_db_error, map_unique_violation, round_not_found};

/// PostgreSQL implementation of SubmissionRepository
#[derive(Clone)]
pub struct PgSubmissionRepository {
    pool: PgPool,
}

impl PgSubmissionRepository {
    /// Create a new PgSubmissionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionRepository for PgSubmissionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Submission>> {
        let result = sqlx::query_as::<_, SubmissionModel>(
            r#"
            SELECT id, round_id, league_id, user_id, title, artist, album,
                   external_id, genre, submitted_at
            FROM submissions
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Submission::from))
    }

    #[instrument(skip(self))]
    async fn find_by_round(&self, round_id: Snowflake) -> RepoResult<Vec<Submission>> {
        let results = sqlx::query_as::<_, SubmissionModel>(
            r#"
            SELECT id, round_id, league_id, user_id, title, artist, album,
                   external_id, genre, submitted_at
            FROM submissions
            WHERE round_id = $1
            ORDER BY submitted_at ASC, id ASC
            "#,
        )
        .bind(round_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Submission::from).collect())
    }

    #[instrument(skip(self, round_ids), fields(rounds = round_ids.len()))]
    async fn find_by_rounds(&self, round_ids: &[Snowflake]) -> RepoResult<Vec<Submission>> {
        if round_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = round_ids.iter().map(|id| id.into_inner()).collect();

        let results = sqlx::query_as::<_, SubmissionModel>(
            r#"
            SELECT id, round_id, league_id, user_id, title, artist, album,
                   external_id, genre, submitted_at
            FROM submissions
            WHERE round_id = ANY($1)
            ORDER BY submitted_at ASC, id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Submission::from).collect())
    }

    #[instrument(skip(self))]
    async fn count_by_round(&self, round_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions WHERE round_id = $1")
            .bind(round_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, submission), fields(round_id = %submission.round_id, user_id = %submission.user_id))]
    async fn create(&self, submission: &Submission, allow_multiple: bool) -> RepoResult<()> {
        let insert = SubmissionInsert::new(submission);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Holding the round row keeps a concurrent transition from closing
        // the window between this check and the insert.
        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM rounds WHERE id = $1 FOR UPDATE",
        )
        .bind(insert.round_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| round_not_found(submission.round_id))?;

        let status: RoundStatus = parse_column("status", &status)?;
        if status != RoundStatus::Submitting {
            return Err(DomainError::ActionNotAllowed {
                action: RoundActions::SUBMIT.label(),
                status,
            });
        }

        if !allow_multiple {
            let existing = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM submissions WHERE round_id = $1 AND user_id = $2)",
            )
            .bind(insert.round_id)
            .bind(insert.user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if existing {
                return Err(DomainError::DuplicateSubmission);
            }
        }

        sqlx::query(
            r#"
            INSERT INTO submissions (id, round_id, league_id, user_id, title, artist, album,
                                     external_id, genre, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(insert.id)
        .bind(insert.round_id)
        .bind(insert.league_id)
        .bind(insert.user_id)
        .bind(insert.title)
        .bind(insert.artist)
        .bind(insert.album)
        .bind(insert.external_id)
        .bind(insert.genre)
        .bind(submission.submitted_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateEntry("submission".into())))?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}

//! PostgreSQL implementation of VoteRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use league_core::entities::Vote;
use league_core::error::DomainError;
use league_core::traits::{RepoResult, VoteRepository};
use league_core::value_objects::{RoundActions, RoundStatus, Snowflake};

use crate::mappers::{convert_all, parse_column, VoteInsert};
use crate::models::VoteModel;

use super::error::{map_db_error, round_not_found};

/// PostgreSQL implementation of VoteRepository
#[derive(Clone)]
pub struct PgVoteRepository {
    pool: PgPool,
}

impl PgVoteRepository {
    /// Create a new PgVoteRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Share-lock the round and require it to be open for voting. Ballots
    /// may run in parallel; a transition waits for all of them.
    async fn lock_voting_round(
        tx: &mut Transaction<'_, Postgres>,
        round_id: Snowflake,
    ) -> Result<(), DomainError> {
        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM rounds WHERE id = $1 FOR SHARE",
        )
        .bind(round_id.into_inner())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| round_not_found(round_id))?;

        let status: RoundStatus = parse_column("status", &status)?;
        if status != RoundStatus::Voting {
            return Err(DomainError::ActionNotAllowed {
                action: RoundActions::VOTE.label(),
                status,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VoteRepository for PgVoteRepository {
    #[instrument(skip(self))]
    async fn find_by_round(&self, round_id: Snowflake) -> RepoResult<Vec<Vote>> {
        let results = sqlx::query_as::<_, VoteModel>(
            r#"
            SELECT id, round_id, submission_id, voter_id, kind, points, created_at, updated_at
            FROM votes
            WHERE round_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(round_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self, round_ids), fields(rounds = round_ids.len()))]
    async fn find_by_rounds(&self, round_ids: &[Snowflake]) -> RepoResult<Vec<Vote>> {
        if round_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = round_ids.iter().map(|id| id.into_inner()).collect();

        let results = sqlx::query_as::<_, VoteModel>(
            r#"
            SELECT id, round_id, submission_id, voter_id, kind, points, created_at, updated_at
            FROM votes
            WHERE round_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self))]
    async fn find_by_voter(
        &self,
        round_id: Snowflake,
        voter_id: Snowflake,
    ) -> RepoResult<Vec<Vote>> {
        let results = sqlx::query_as::<_, VoteModel>(
            r#"
            SELECT id, round_id, submission_id, voter_id, kind, points, created_at, updated_at
            FROM votes
            WHERE round_id = $1 AND voter_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(round_id.into_inner())
        .bind(voter_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self, vote), fields(round_id = %vote.round_id, voter_id = %vote.voter_id))]
    async fn upsert(&self, vote: &Vote) -> RepoResult<Vote> {
        let insert = VoteInsert::new(vote);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        Self::lock_voting_round(&mut tx, vote.round_id).await?;

        let stored = sqlx::query_as::<_, VoteModel>(
            r#"
            INSERT INTO votes (id, round_id, submission_id, voter_id, kind, points,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (submission_id, voter_id)
            DO UPDATE SET kind = EXCLUDED.kind,
                          points = EXCLUDED.points,
                          updated_at = EXCLUDED.updated_at
            RETURNING id, round_id, submission_id, voter_id, kind, points, created_at, updated_at
            "#,
        )
        .bind(insert.id)
        .bind(insert.round_id)
        .bind(insert.submission_id)
        .bind(insert.voter_id)
        .bind(insert.kind)
        .bind(insert.points)
        .bind(vote.created_at)
        .bind(vote.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Vote::try_from(stored)
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        round_id: Snowflake,
        submission_id: Snowflake,
        voter_id: Snowflake,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        Self::lock_voting_round(&mut tx, round_id).await?;

        let result = sqlx::query(
            "DELETE FROM votes WHERE round_id = $1 AND submission_id = $2 AND voter_id = $3",
        )
        .bind(round_id.into_inner())
        .bind(submission_id.into_inner())
        .bind(voter_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::VoteNotFound);
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}

//! PostgreSQL implementation of RoundRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use league_core::entities::Round;
use league_core::error::DomainError;
use league_core::traits::{RepoResult, RoundRepository};
use league_core::value_objects::{RoundStatus, Snowflake};

use crate::mappers::{convert_all, RoundInsert};
use crate::models::RoundModel;

use super::error::{map_db_error, map_unique_violation, round_not_found};

/// PostgreSQL implementation of RoundRepository
#[derive(Clone)]
pub struct PgRoundRepository {
    pool: PgPool,
}

impl PgRoundRepository {
    /// Create a new PgRoundRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain why a status-guarded write touched no rows
    async fn stale_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Snowflake,
        expected: RoundStatus,
    ) -> DomainError {
        let actual = sqlx::query_scalar::<_, String>("SELECT status FROM rounds WHERE id = $1")
            .bind(id.into_inner())
            .fetch_optional(&mut **tx)
            .await;

        match actual {
            Ok(Some(actual)) => DomainError::ConcurrentModification(format!(
                "round {id} is {actual}, expected {expected}"
            )),
            Ok(None) => round_not_found(id),
            Err(e) => map_db_error(e),
        }
    }
}

#[async_trait]
impl RoundRepository for PgRoundRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Round>> {
        let result = sqlx::query_as::<_, RoundModel>(
            r#"
            SELECT id, league_id, season_id, theme, description, status,
                   submission_start, submission_end, voting_start, voting_end,
                   created_by, created_at, updated_at
            FROM rounds
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Round::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Round>> {
        let results = sqlx::query_as::<_, RoundModel>(
            r#"
            SELECT id, league_id, season_id, theme, description, status,
                   submission_start, submission_end, voting_start, voting_end,
                   created_by, created_at, updated_at
            FROM rounds
            WHERE league_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(league_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self))]
    async fn find_revealed(
        &self,
        league_id: Snowflake,
        season_id: Option<Snowflake>,
    ) -> RepoResult<Vec<Round>> {
        let results = sqlx::query_as::<_, RoundModel>(
            r#"
            SELECT id, league_id, season_id, theme, description, status,
                   submission_start, submission_end, voting_start, voting_end,
                   created_by, created_at, updated_at
            FROM rounds
            WHERE league_id = $1
              AND status IN ('revealed', 'archived')
              AND ($2::BIGINT IS NULL OR season_id = $2)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(league_id.into_inner())
        .bind(season_id.map(Snowflake::into_inner))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self))]
    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<Round>> {
        let results = sqlx::query_as::<_, RoundModel>(
            r#"
            SELECT id, league_id, season_id, theme, description, status,
                   submission_start, submission_end, voting_start, voting_end,
                   created_by, created_at, updated_at
            FROM rounds
            WHERE (status = 'submitting' AND submission_end <= $1
                   AND (EXISTS (SELECT 1 FROM submissions s WHERE s.round_id = rounds.id)
                        OR EXISTS (SELECT 1 FROM leagues l
                                   WHERE l.id = rounds.league_id
                                     AND l.empty_round_policy <> 'hold')))
               OR (status = 'voting' AND voting_end <= $1)
            ORDER BY COALESCE(
                CASE status WHEN 'submitting' THEN submission_end ELSE voting_end END,
                created_at
            ) ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit.clamp(1, 1000))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }

    #[instrument(skip(self, round), fields(round_id = %round.id))]
    async fn create(&self, round: &Round) -> RepoResult<()> {
        let insert = RoundInsert::new(round);

        sqlx::query(
            r#"
            INSERT INTO rounds (id, league_id, season_id, theme, description, status,
                                submission_start, submission_end, voting_start, voting_end,
                                created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(insert.id)
        .bind(insert.league_id)
        .bind(insert.season_id)
        .bind(insert.theme)
        .bind(insert.description)
        .bind(insert.status)
        .bind(insert.submission_start)
        .bind(insert.submission_end)
        .bind(insert.voting_start)
        .bind(insert.voting_end)
        .bind(insert.created_by)
        .bind(round.created_at)
        .bind(round.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateEntry("round".into())))?;

        Ok(())
    }

    #[instrument(skip(self, round), fields(round_id = %round.id))]
    async fn update_details(&self, round: &Round, expected: RoundStatus) -> RepoResult<()> {
        let insert = RoundInsert::new(round);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r#"
            UPDATE rounds
            SET theme = $3, description = $4, season_id = $5,
                submission_start = $6, submission_end = $7,
                voting_start = $8, voting_end = $9, updated_at = $10
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(insert.id)
        .bind(expected.as_str())
        .bind(insert.theme)
        .bind(insert.description)
        .bind(insert.season_id)
        .bind(insert.submission_start)
        .bind(insert.submission_end)
        .bind(insert.voting_start)
        .bind(insert.voting_end)
        .bind(round.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(Self::stale_status(&mut tx, round.id, expected).await);
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        id: Snowflake,
        from: RoundStatus,
        to: RoundStatus,
        now: DateTime<Utc>,
    ) -> RepoResult<Round> {
        from.ensure_transition(to)?;
        let revert = from == RoundStatus::Voting && to == RoundStatus::Submitting;
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let updated = sqlx::query_as::<_, RoundModel>(
            r#"
            UPDATE rounds
            SET status = $3,
                updated_at = $4,
                submission_end = CASE WHEN $5 AND submission_end <= $4
                                      THEN NULL ELSE submission_end END
            WHERE id = $1 AND status = $2
            RETURNING id, league_id, season_id, theme, description, status,
                      submission_start, submission_end, voting_start, voting_end,
                      created_by, created_at, updated_at
            "#,
        )
        .bind(id.into_inner())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(now)
        .bind(revert)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(updated) = updated else {
            return Err(Self::stale_status(&mut tx, id, from).await);
        };

        if revert {
            let discarded = sqlx::query("DELETE FROM votes WHERE round_id = $1")
                .bind(id.into_inner())
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?
                .rows_affected();
            debug!(round_id = %id, discarded, "Votes discarded by revert");
        }

        tx.commit().await.map_err(map_db_error)?;
        Round::try_from(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgRoundRepository>();
    }
}

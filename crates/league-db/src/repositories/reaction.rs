//! PostgreSQL implementations of ReactionRepository and CommentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use league_core::entities::{Comment, Reaction};
use league_core::traits::{CommentRepository, ReactionRepository, RepoResult};
use league_core::value_objects::Snowflake;

use crate::models::{CommentModel, ReactionModel};

use super::error::{comment_not_found, map_db_error};

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self, reaction), fields(submission_id = %reaction.submission_id))]
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let removed = sqlx::query(
            "DELETE FROM reactions WHERE submission_id = $1 AND user_id = $2 AND emoji = $3",
        )
        .bind(reaction.submission_id.into_inner())
        .bind(reaction.user_id.into_inner())
        .bind(&reaction.emoji)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?
        .rows_affected();

        if removed == 0 {
            sqlx::query(
                r#"
                INSERT INTO reactions (submission_id, user_id, emoji, created_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(reaction.submission_id.into_inner())
            .bind(reaction.user_id.into_inner())
            .bind(&reaction.emoji)
            .bind(reaction.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(removed == 0)
    }

    #[instrument(skip(self))]
    async fn find_by_submission(&self, submission_id: Snowflake) -> RepoResult<Vec<Reaction>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT submission_id, user_id, emoji, created_at
            FROM reactions
            WHERE submission_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(submission_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Reaction::from).collect())
    }
}

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>> {
        let result = sqlx::query_as::<_, CommentModel>(
            r#"
            SELECT id, round_id, submission_id, author_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Comment::from))
    }

    #[instrument(skip(self))]
    async fn find_by_submission(&self, submission_id: Snowflake) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(
            r#"
            SELECT id, round_id, submission_id, author_id, content, created_at
            FROM comments
            WHERE submission_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(submission_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id))]
    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, round_id, submission_id, author_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id.into_inner())
        .bind(comment.round_id.into_inner())
        .bind(comment.submission_id.into_inner())
        .bind(comment.author_id.into_inner())
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(comment_not_found(id));
        }

        Ok(())
    }
}

//! PostgreSQL implementation of ModerationRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use league_core::entities::{ModerationEffect, ModerationLogEntry};
use league_core::error::DomainError;
use league_core::traits::{ModerationRepository, RepoResult};
use league_core::value_objects::{MemberRole, Snowflake};

use crate::mappers::{convert_all, parse_column};
use crate::models::ModerationLogModel;

use super::error::{lock_membership, map_db_error, map_unique_violation};

/// PostgreSQL implementation of ModerationRepository
#[derive(Clone)]
pub struct PgModerationRepository {
    pool: PgPool,
}

impl PgModerationRepository {
    /// Create a new PgModerationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock and return `(row id, role)` of the active membership, if any
    async fn active_row(
        tx: &mut Transaction<'_, Postgres>,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<Option<(i64, MemberRole)>, DomainError> {
        let row = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT id, role FROM league_members
            WHERE league_id = $1 AND user_id = $2
              AND removed_at IS NULL AND banned_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(league_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_db_error)?;

        row.map(|(id, role)| parse_column::<MemberRole>("role", &role).map(|role| (id, role)))
            .transpose()
    }

    /// The decision was made against a role that is no longer current
    fn stale(expected: Option<MemberRole>, actual: Option<MemberRole>) -> DomainError {
        let show = |role: Option<MemberRole>| role.map_or("none", MemberRole::as_str);
        DomainError::ConcurrentModification(format!(
            "member role changed from {} to {}",
            show(expected),
            show(actual)
        ))
    }

    async fn apply_effect(
        tx: &mut Transaction<'_, Postgres>,
        effect: &ModerationEffect,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), DomainError> {
        match effect {
            ModerationEffect::Kick {
                league_id,
                user_id,
                expected_role,
            } => {
                let Some((row_id, role)) = Self::active_row(tx, *league_id, *user_id).await? else {
                    return Err(DomainError::MemberNotFound);
                };
                if role != *expected_role {
                    return Err(Self::stale(Some(*expected_role), Some(role)));
                }
                sqlx::query("UPDATE league_members SET removed_at = $2 WHERE id = $1")
                    .bind(row_id)
                    .bind(at)
                    .execute(&mut **tx)
                    .await
                    .map_err(map_db_error)?;
            }
            ModerationEffect::Ban {
                league_id,
                user_id,
                expected_role,
                placeholder_id,
                reason,
            } => {
                let active = Self::active_row(tx, *league_id, *user_id).await?;
                let actual = active.map(|(_, role)| role);
                if actual != *expected_role {
                    return Err(Self::stale(*expected_role, actual));
                }

                let result = match active {
                    Some((row_id, _)) => {
                        sqlx::query(
                            r#"
                            UPDATE league_members
                            SET banned_at = $2, ban_reason = $3
                            WHERE id = $1
                            "#,
                        )
                        .bind(row_id)
                        .bind(at)
                        .bind(reason.as_deref())
                        .execute(&mut **tx)
                        .await
                    }
                    // Pre-emptive ban of someone who is not a member
                    None => {
                        sqlx::query(
                            r#"
                            INSERT INTO league_members (id, league_id, user_id, role, joined_at,
                                                        removed_at, banned_at, ban_reason)
                            VALUES ($1, $2, $3, 'member', $4, $4, $4, $5)
                            "#,
                        )
                        .bind(placeholder_id.into_inner())
                        .bind(league_id.into_inner())
                        .bind(user_id.into_inner())
                        .bind(at)
                        .bind(reason.as_deref())
                        .execute(&mut **tx)
                        .await
                    }
                };
                result.map_err(|e| map_unique_violation(e, || DomainError::AlreadyBanned))?;
            }
            ModerationEffect::Unban { league_id, user_id } => {
                let result = sqlx::query(
                    r#"
                    UPDATE league_members
                    SET ban_lifted_at = $3
                    WHERE league_id = $1 AND user_id = $2
                      AND banned_at IS NOT NULL AND ban_lifted_at IS NULL
                    "#,
                )
                .bind(league_id.into_inner())
                .bind(user_id.into_inner())
                .bind(at)
                .execute(&mut **tx)
                .await
                .map_err(map_db_error)?;

                if result.rows_affected() == 0 {
                    return Err(DomainError::NotBanned);
                }
            }
            ModerationEffect::ChangeRole {
                league_id,
                user_id,
                from,
                to,
            } => {
                let Some((row_id, role)) = Self::active_row(tx, *league_id, *user_id).await? else {
                    return Err(DomainError::MemberNotFound);
                };
                if role != *from {
                    return Err(Self::stale(Some(*from), Some(role)));
                }
                sqlx::query("UPDATE league_members SET role = $2 WHERE id = $1")
                    .bind(row_id)
                    .bind(to.as_str())
                    .execute(&mut **tx)
                    .await
                    .map_err(map_db_error)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ModerationRepository for PgModerationRepository {
    #[instrument(skip(self, effect, entry), fields(action = entry.action.as_str(), target_id = %entry.target_id))]
    async fn apply(&self, effect: &ModerationEffect, entry: &ModerationLogEntry) -> RepoResult<()> {
        let (league_id, user_id) = effect.target();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_membership(&mut tx, league_id, user_id).await?;

        Self::apply_effect(&mut tx, effect, entry.created_at).await?;

        sqlx::query(
            r#"
            INSERT INTO moderation_log (id, league_id, performer_id, target_id, action,
                                        reason, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id.into_inner())
        .bind(entry.league_id.into_inner())
        .bind(entry.performer_id.into_inner())
        .bind(entry.target_id.into_inner())
        .bind(entry.action.as_str())
        .bind(entry.reason.as_deref())
        .bind(entry.metadata.clone())
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        info!(
            league_id = %league_id,
            performer_id = %entry.performer_id,
            "Moderation action applied"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_log(
        &self,
        league_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationLogEntry>> {
        let results = sqlx::query_as::<_, ModerationLogModel>(
            r#"
            SELECT id, league_id, performer_id, target_id, action, reason, metadata, created_at
            FROM moderation_log
            WHERE league_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(league_id.into_inner())
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        convert_all(results)
    }
}

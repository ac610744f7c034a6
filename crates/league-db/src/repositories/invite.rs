//! PostgreSQL implementation of InviteRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use league_core::entities::{Invite, LeagueMember};
use league_core::error::DomainError;
use league_core::traits::{InviteRepository, RepoResult};
use league_core::value_objects::Snowflake;

use crate::models::InviteModel;

use super::error::{invite_not_found, lock_membership, map_db_error, map_unique_violation};

/// PostgreSQL implementation of InviteRepository
#[derive(Clone)]
pub struct PgInviteRepository {
    pool: PgPool,
}

impl PgInviteRepository {
    /// Create a new PgInviteRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteRepository for PgInviteRepository {
    #[instrument(skip(self, handle))]
    async fn find_by_handle(&self, handle: &str) -> RepoResult<Option<Invite>> {
        let result = sqlx::query_as::<_, InviteModel>(
            r#"
            SELECT code, link_token, league_id, created_by, uses, max_uses,
                   expires_at, created_at
            FROM invites
            WHERE code = $1 OR link_token = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Invite::from))
    }

    #[instrument(skip(self))]
    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Invite>> {
        let results = sqlx::query_as::<_, InviteModel>(
            r#"
            SELECT code, link_token, league_id, created_by, uses, max_uses,
                   expires_at, created_at
            FROM invites
            WHERE league_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(league_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Invite::from).collect())
    }

    #[instrument(skip(self, invite), fields(league_id = %invite.league_id))]
    async fn create(&self, invite: &Invite) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invites (code, link_token, league_id, created_by, uses, max_uses,
                                 expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&invite.code)
        .bind(&invite.link_token)
        .bind(invite.league_id.into_inner())
        .bind(invite.created_by.into_inner())
        .bind(invite.uses)
        .bind(invite.max_uses)
        .bind(invite.expires_at)
        .bind(invite.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::DuplicateEntry("invite code".into())))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, code: &str) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM invites WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(invite_not_found(code));
        }

        Ok(())
    }

    #[instrument(skip(self, handle, member), fields(user_id = %member.user_id))]
    async fn redeem(
        &self,
        handle: &str,
        member: &LeagueMember,
        now: DateTime<Utc>,
    ) -> RepoResult<Invite> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // The row lock serializes every redeemer of this invite, so the
        // capacity check below sees the count left by the previous winner.
        let invite = sqlx::query_as::<_, InviteModel>(
            r#"
            SELECT code, link_token, league_id, created_by, uses, max_uses,
                   expires_at, created_at
            FROM invites
            WHERE code = $1 OR link_token = $1
            FOR UPDATE
            "#,
        )
        .bind(handle)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(Invite::from)
        .ok_or_else(|| invite_not_found(handle))?;

        if invite.is_expired(now) {
            return Err(DomainError::InviteExpired);
        }
        if invite.is_exhausted() {
            return Err(DomainError::InviteExhausted);
        }

        let league_id = invite.league_id;
        lock_membership(&mut tx, league_id, member.user_id).await?;

        let (banned, active) = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM league_members
                        WHERE league_id = $1 AND user_id = $2
                          AND banned_at IS NOT NULL AND ban_lifted_at IS NULL),
                EXISTS (SELECT 1 FROM league_members
                        WHERE league_id = $1 AND user_id = $2
                          AND removed_at IS NULL AND banned_at IS NULL)
            "#,
        )
        .bind(league_id.into_inner())
        .bind(member.user_id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if banned {
            return Err(DomainError::UserBanned);
        }
        if active {
            return Err(DomainError::AlreadyMember);
        }

        sqlx::query(
            r#"
            INSERT INTO league_members (id, league_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(member.id.into_inner())
        .bind(league_id.into_inner())
        .bind(member.user_id.into_inner())
        .bind(member.role.as_str())
        .bind(member.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        let updated = sqlx::query_as::<_, InviteModel>(
            r#"
            UPDATE invites
            SET uses = uses + 1
            WHERE code = $1
            RETURNING code, link_token, league_id, created_by, uses, max_uses,
                      expires_at, created_at
            "#,
        )
        .bind(&invite.code)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(code = %invite.code, uses = updated.uses, "Invite redeemed");
        Ok(Invite::from(updated))
    }
}

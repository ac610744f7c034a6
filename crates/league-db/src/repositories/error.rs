//! Error handling utilities for repositories

use league_core::error::DomainError;
use league_core::value_objects::Snowflake;
use sqlx::{Error as SqlxError, Postgres, Transaction};

// SQLSTATE codes for transactions Postgres aborted to keep them serializable
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if matches!(
            db_err.code().as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)
        ) {
            return DomainError::ConcurrentModification(db_err.message().to_string());
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

/// Serialize every membership write for one (league, user) pair.
///
/// Transaction-scoped advisory lock, released on commit or rollback. Redeem
/// and moderation both take it, so a ban can never interleave with a join.
pub async fn lock_membership(
    tx: &mut Transaction<'_, Postgres>,
    league_id: Snowflake,
    user_id: Snowflake,
) -> Result<(), DomainError> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("membership:{league_id}:{user_id}"))
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

/// Create a "league not found" error
pub fn league_not_found(id: Snowflake) -> DomainError {
    DomainError::LeagueNotFound(id)
}

/// Create a "round not found" error
pub fn round_not_found(id: Snowflake) -> DomainError {
    DomainError::RoundNotFound(id)
}

/// Create a "comment not found" error
pub fn comment_not_found(id: Snowflake) -> DomainError {
    DomainError::CommentNotFound(id)
}

/// Create an "invite not found" error
pub fn invite_not_found(handle: &str) -> DomainError {
    DomainError::InviteNotFound(handle.to_string())
}

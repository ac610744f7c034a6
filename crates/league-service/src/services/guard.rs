//! Membership guard
//!
//! Answers "is this caller an active, non-banned member of the league, with
//! at least this role?" Every league-scoped service call goes through here
//! before touching state.

use league_core::entities::{League, LeagueMember};
use league_core::{DomainError, MemberRole, Snowflake};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Membership and role checks for league access
pub struct MembershipGuard<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipGuard<'a> {
    /// Create a new MembershipGuard
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Load a league or fail with not found
    #[instrument(skip(self))]
    pub async fn league(&self, league_id: Snowflake) -> ServiceResult<League> {
        Ok(self
            .ctx
            .league_repo()
            .find_by_id(league_id)
            .await?
            .ok_or(DomainError::LeagueNotFound(league_id))?)
    }

    /// The caller's active membership, if any
    pub async fn membership(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Option<LeagueMember>> {
        Ok(self.ctx.member_repo().find_active(league_id, user_id).await?)
    }

    /// Require an active membership
    ///
    /// An unknown league reports not found; a known league without the caller
    /// reports forbidden.
    #[instrument(skip(self))]
    pub async fn require_member(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<LeagueMember> {
        if let Some(member) = self.membership(league_id, user_id).await? {
            return Ok(member);
        }

        self.league(league_id).await?;
        debug!(league_id = %league_id, user_id = %user_id, "Caller is not a member");
        Err(DomainError::NotAMember.into())
    }

    /// Require an active membership whose role is one of `allowed`
    #[instrument(skip(self))]
    pub async fn require_role(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
        allowed: &[MemberRole],
    ) -> ServiceResult<LeagueMember> {
        let member = self.require_member(league_id, user_id).await?;
        if allowed.contains(&member.role) {
            return Ok(member);
        }

        let required = allowed
            .iter()
            .copied()
            .min_by_key(|role| role.rank())
            .unwrap_or(MemberRole::Owner);
        Err(DomainError::InsufficientRole { required }.into())
    }

    /// Require an owner or admin
    pub async fn require_manager(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<LeagueMember> {
        self.require_role(league_id, user_id, &[MemberRole::Owner, MemberRole::Admin])
            .await
    }
}

/// Whether `actor` may kick, ban or change the role of `target_id`.
///
/// The actor must manage the league and strictly outrank the target. Nobody
/// moderates themselves or the owner.
pub fn can_moderate(
    actor: &LeagueMember,
    target_id: Snowflake,
    target_role: MemberRole,
) -> Result<(), DomainError> {
    if actor.user_id == target_id {
        return Err(DomainError::CannotModerateSelf);
    }
    if !actor.role.is_manager() {
        return Err(DomainError::InsufficientRole {
            required: MemberRole::Admin,
        });
    }
    if target_role == MemberRole::Owner || !actor.role.outranks(target_role) {
        return Err(DomainError::CannotModerateMember);
    }
    Ok(())
}

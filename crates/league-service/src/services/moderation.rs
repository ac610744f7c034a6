//! Moderation service
//!
//! Kicks, bans, unbans and role changes. Each one is handed to the
//! repository together with its audit entry so both land or neither does.

use league_core::entities::ModerationEffect;
use league_core::{DomainError, MemberRole, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{
    BanResponse, ChangeRoleRequest, MemberResponse, ModerationLogResponse, ModerationRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::guard::{can_moderate, MembershipGuard};

pub const DEFAULT_LOG_LIMIT: i64 = 50;
pub const MAX_LOG_LIMIT: i64 = 100;

/// Moderation service
pub struct ModerationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ModerationService<'a> {
    /// Create a new ModerationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Remove an active member. They may rejoin with a new invite.
    #[instrument(skip(self, request))]
    pub async fn kick(
        &self,
        league_id: Snowflake,
        actor_id: Snowflake,
        target_id: Snowflake,
        request: ModerationRequest,
    ) -> ServiceResult<()> {
        let guard = MembershipGuard::new(self.ctx);
        let actor = guard.require_member(league_id, actor_id).await?;
        let target = guard
            .membership(league_id, target_id)
            .await?
            .ok_or(DomainError::MemberNotFound)?;
        if let Err(e) = can_moderate(&actor, target_id, target.role) {
            warn!(league_id = %league_id, actor_id = %actor_id, target_id = %target_id, error = %e, "Kick refused");
            return Err(e.into());
        }

        self.apply(
            ModerationEffect::Kick {
                league_id,
                user_id: target_id,
                expected_role: target.role,
            },
            actor_id,
            request.reason,
        )
        .await?;

        info!(league_id = %league_id, actor_id = %actor_id, target_id = %target_id, "Member kicked");
        Ok(())
    }

    /// Ban a user. Users who are not members can be banned ahead of time.
    #[instrument(skip(self, request))]
    pub async fn ban(
        &self,
        league_id: Snowflake,
        actor_id: Snowflake,
        target_id: Snowflake,
        request: ModerationRequest,
    ) -> ServiceResult<()> {
        let guard = MembershipGuard::new(self.ctx);
        let actor = guard.require_member(league_id, actor_id).await?;

        if self
            .ctx
            .member_repo()
            .find_active_ban(league_id, target_id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyBanned.into());
        }

        let target_role = guard.membership(league_id, target_id).await?.map(|m| m.role);
        if let Err(e) = can_moderate(&actor, target_id, target_role.unwrap_or(MemberRole::Member)) {
            warn!(league_id = %league_id, actor_id = %actor_id, target_id = %target_id, error = %e, "Ban refused");
            return Err(e.into());
        }

        self.apply(
            ModerationEffect::Ban {
                league_id,
                user_id: target_id,
                expected_role: target_role,
                placeholder_id: self.ctx.generate_id(),
                reason: request.reason.clone(),
            },
            actor_id,
            request.reason,
        )
        .await?;

        info!(
            league_id = %league_id,
            actor_id = %actor_id,
            target_id = %target_id,
            was_member = target_role.is_some(),
            "User banned"
        );
        Ok(())
    }

    /// Lift a ban. Membership is not restored.
    #[instrument(skip(self, request))]
    pub async fn unban(
        &self,
        league_id: Snowflake,
        actor_id: Snowflake,
        target_id: Snowflake,
        request: ModerationRequest,
    ) -> ServiceResult<()> {
        MembershipGuard::new(self.ctx)
            .require_manager(league_id, actor_id)
            .await?;

        self.apply(
            ModerationEffect::Unban {
                league_id,
                user_id: target_id,
            },
            actor_id,
            request.reason,
        )
        .await?;

        info!(league_id = %league_id, actor_id = %actor_id, target_id = %target_id, "User unbanned");
        Ok(())
    }

    /// Change a member's role. The owner role is never granted or revoked.
    #[instrument(skip(self, request))]
    pub async fn change_role(
        &self,
        league_id: Snowflake,
        actor_id: Snowflake,
        target_id: Snowflake,
        request: ChangeRoleRequest,
    ) -> ServiceResult<MemberResponse> {
        if request.role == MemberRole::Owner {
            return Err(DomainError::CannotChangeOwnerRole.into());
        }

        let guard = MembershipGuard::new(self.ctx);
        let actor = guard.require_member(league_id, actor_id).await?;
        let mut target = guard
            .membership(league_id, target_id)
            .await?
            .ok_or(DomainError::MemberNotFound)?;
        if target.role == MemberRole::Owner {
            return Err(DomainError::CannotChangeOwnerRole.into());
        }
        can_moderate(&actor, target_id, target.role)?;
        if request.role.outranks(actor.role) {
            return Err(DomainError::CannotModerateMember.into());
        }
        if request.role == target.role {
            return Err(DomainError::RoleUnchanged(target.role).into());
        }

        let from = target.role;
        self.apply(
            ModerationEffect::ChangeRole {
                league_id,
                user_id: target_id,
                from,
                to: request.role,
            },
            actor_id,
            request.reason,
        )
        .await?;

        info!(
            league_id = %league_id,
            actor_id = %actor_id,
            target_id = %target_id,
            from = from.as_str(),
            to = request.role.as_str(),
            "Member role changed"
        );
        target.role = request.role;
        Ok(MemberResponse::from(&target))
    }

    /// Audit log, newest first (owner or admin)
    #[instrument(skip(self))]
    pub async fn moderation_log(
        &self,
        league_id: Snowflake,
        actor_id: Snowflake,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<ModerationLogResponse>> {
        MembershipGuard::new(self.ctx)
            .require_manager(league_id, actor_id)
            .await?;

        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
        let entries = self.ctx.moderation_repo().find_log(league_id, limit).await?;
        Ok(entries.iter().map(ModerationLogResponse::from).collect())
    }

    /// Outstanding bans (owner or admin)
    #[instrument(skip(self))]
    pub async fn list_bans(
        &self,
        league_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<Vec<BanResponse>> {
        MembershipGuard::new(self.ctx)
            .require_manager(league_id, actor_id)
            .await?;

        let bans = self.ctx.member_repo().find_bans(league_id).await?;
        Ok(bans.iter().map(BanResponse::from).collect())
    }

    async fn apply(
        &self,
        effect: ModerationEffect,
        actor_id: Snowflake,
        reason: Option<String>,
    ) -> ServiceResult<()> {
        let entry = effect.log_entry(self.ctx.generate_id(), actor_id, reason, self.ctx.now());
        self.ctx.moderation_repo().apply(&effect, &entry).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::CreateInviteRequest;
    use crate::services::test_support::TestLeague;
    use crate::services::{InviteService, LeagueService};
    use league_core::entities::ModerationAction;

    fn reason(text: &str) -> ModerationRequest {
        ModerationRequest {
            reason: Some(text.to_string()),
        }
    }

    #[tokio::test]
    async fn test_ban_writes_one_entry_and_one_ban() {
        let league = TestLeague::new().await;
        let member = league.join().await;
        let service = ModerationService::new(&league.ctx);

        service
            .ban(league.id, league.owner, member, reason("spam"))
            .await
            .unwrap();

        let log = service.moderation_log(league.id, league.owner, None).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, ModerationAction::Ban);
        assert_eq!(log[0].target_id, member);
        assert_eq!(log[0].reason.as_deref(), Some("spam"));

        let bans = service.list_bans(league.id, league.owner).await.unwrap();
        assert_eq!(bans.len(), 1);
        assert_eq!(bans[0].user_id, member);
        assert!(bans[0].banned_at.is_some());

        let err = service
            .ban(league.id, league.owner, member, reason("again"))
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::AlreadyBanned)));
        assert_eq!(
            service.moderation_log(league.id, league.owner, None).await.unwrap().len(),
            1
        );

        let members = LeagueService::new(&league.ctx)
            .list_members(league.id, league.owner)
            .await
            .unwrap();
        assert!(members.iter().all(|m| m.user_id != member));
    }

    #[tokio::test]
    async fn test_unban_then_reinvite_creates_new_row() {
        let league = TestLeague::new().await;
        let member = league.join().await;
        let service = ModerationService::new(&league.ctx);

        service
            .ban(league.id, league.owner, member, ModerationRequest::default())
            .await
            .unwrap();
        service
            .unban(league.id, league.owner, member, ModerationRequest::default())
            .await
            .unwrap();
        assert!(league
            .ctx
            .member_repo()
            .find_active(league.id, member)
            .await
            .unwrap()
            .is_none());

        let invite = InviteService::new(&league.ctx)
            .create_invite(league.id, league.owner, CreateInviteRequest::default())
            .await
            .unwrap();
        InviteService::new(&league.ctx)
            .redeem(&invite.code, member)
            .await
            .unwrap();

        let history = league
            .ctx
            .member_repo()
            .find_history(league.id, member)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_ne!(history[0].id, history[1].id);
        assert!(history[0].banned_at.is_some());
        assert!(history[1].is_active());
    }

    #[tokio::test]
    async fn test_pre_emptive_ban() {
        let league = TestLeague::new().await;
        let outsider = league.ctx.generate_id();
        let service = ModerationService::new(&league.ctx);

        service
            .ban(league.id, league.owner, outsider, ModerationRequest::default())
            .await
            .unwrap();
        let bans = service.list_bans(league.id, league.owner).await.unwrap();
        assert_eq!(bans[0].user_id, outsider);
    }

    #[tokio::test]
    async fn test_admin_limits() {
        let league = TestLeague::new().await;
        let (admin, other_admin) = (league.join_admin().await, league.join_admin().await);
        let member = league.join().await;
        let service = ModerationService::new(&league.ctx);

        let err = service
            .kick(league.id, admin, other_admin, ModerationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::CannotModerateMember)));

        let err = service
            .ban(league.id, admin, league.owner, ModerationRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = service
            .kick(league.id, member, admin, ModerationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InsufficientRole { .. })));

        service
            .kick(league.id, admin, member, reason("inactive"))
            .await
            .unwrap();
        let log = service.moderation_log(league.id, admin, Some(10)).await.unwrap();
        assert_eq!(log[0].action, ModerationAction::Kick);
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_kicked_member_may_rejoin() {
        let league = TestLeague::new().await;
        let member = league.join().await;
        ModerationService::new(&league.ctx)
            .kick(league.id, league.owner, member, ModerationRequest::default())
            .await
            .unwrap();

        let invite = InviteService::new(&league.ctx)
            .create_invite(league.id, league.owner, CreateInviteRequest::default())
            .await
            .unwrap();
        InviteService::new(&league.ctx)
            .redeem(&invite.code, member)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_role_changes() {
        let league = TestLeague::new().await;
        let member = league.join().await;
        let service = ModerationService::new(&league.ctx);

        let err = service
            .change_role(
                league.id,
                league.owner,
                member,
                ChangeRoleRequest {
                    role: MemberRole::Owner,
                    reason: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::CannotChangeOwnerRole)));

        let err = service
            .change_role(
                league.id,
                league.owner,
                member,
                ChangeRoleRequest {
                    role: MemberRole::Member,
                    reason: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::RoleUnchanged(_))));

        let promoted = service
            .change_role(
                league.id,
                league.owner,
                member,
                ChangeRoleRequest {
                    role: MemberRole::Admin,
                    reason: Some("helps out".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(promoted.role, MemberRole::Admin);

        let log = service.moderation_log(league.id, league.owner, None).await.unwrap();
        assert_eq!(log[0].action, ModerationAction::RoleChange);
        assert_eq!(
            log[0].metadata,
            Some(serde_json::json!({"old_role": "member", "new_role": "admin"}))
        );
    }

    #[tokio::test]
    async fn test_unban_without_ban() {
        let league = TestLeague::new().await;
        let err = ModerationService::new(&league.ctx)
            .unban(
                league.id,
                league.owner,
                Snowflake::new(77),
                ModerationRequest::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::NotBanned)));
    }
}

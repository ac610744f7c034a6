//! Invite service
//!
//! Handles invite creation, listing, revocation, public preview and
//! redemption. Redemption is delegated to the repository as one atomic unit;
//! this layer only resolves the league and reports the outcome.

use chrono::Duration;
use league_core::entities::{generate_invite_code, generate_link_token, Invite, LeagueMember};
use league_core::{DomainError, MemberRole, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{
    CreateInviteRequest, InvitePreviewResponse, InviteResponse, LeagueResponse, MemberResponse,
    RedeemInviteResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::guard::MembershipGuard;

/// Attempts at finding an unused code before giving up
const CODE_ATTEMPTS: usize = 3;

/// Invite service
pub struct InviteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InviteService<'a> {
    /// Create a new InviteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an invite (owner or admin)
    #[instrument(skip(self, request))]
    pub async fn create_invite(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
        request: CreateInviteRequest,
    ) -> ServiceResult<InviteResponse> {
        MembershipGuard::new(self.ctx)
            .require_manager(league_id, user_id)
            .await?;

        let now = self.ctx.now();
        let expires_at = request.max_age.map(|secs| now + Duration::seconds(secs));

        for attempt in 1..=CODE_ATTEMPTS {
            let invite = Invite::new(
                generate_invite_code(self.ctx.settings().invite_code_length),
                generate_link_token(),
                league_id,
                user_id,
                now,
            )
            .with_max_uses(request.max_uses)
            .with_expiration(expires_at);

            match self.ctx.invite_repo().create(&invite).await {
                Ok(()) => {
                    info!(
                        code = %invite.code,
                        league_id = %league_id,
                        created_by = %user_id,
                        max_uses = ?invite.max_uses,
                        "Invite created"
                    );
                    return Ok(InviteResponse::from(&invite));
                }
                Err(DomainError::DuplicateEntry(_)) => {
                    warn!(attempt, "Invite code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::internal("could not allocate a unique invite code"))
    }

    /// Invites of a league, newest first (owner or admin)
    #[instrument(skip(self))]
    pub async fn list_invites(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<InviteResponse>> {
        MembershipGuard::new(self.ctx)
            .require_manager(league_id, user_id)
            .await?;

        let invites = self.ctx.invite_repo().find_by_league(league_id).await?;
        Ok(invites.iter().map(InviteResponse::from).collect())
    }

    /// Delete an invite; later redemptions fail with not found
    #[instrument(skip(self))]
    pub async fn revoke_invite(&self, code: &str, user_id: Snowflake) -> ServiceResult<()> {
        let invite = self.find(code).await?;

        MembershipGuard::new(self.ctx)
            .require_manager(invite.league_id, user_id)
            .await?;

        self.ctx.invite_repo().delete(&invite.code).await?;

        info!(code = %invite.code, league_id = %invite.league_id, revoked_by = %user_id, "Invite revoked");
        Ok(())
    }

    /// Public preview by link token or code
    #[instrument(skip(self, handle))]
    pub async fn preview(&self, handle: &str) -> ServiceResult<InvitePreviewResponse> {
        let invite = self.find(handle).await?;
        let league = MembershipGuard::new(self.ctx)
            .league(invite.league_id)
            .await?;
        let member_count = self.ctx.league_repo().member_count(league.id).await?;

        Ok(InvitePreviewResponse {
            league_id: league.id,
            league_name: league.name,
            league_description: league.description,
            member_count,
            usable: invite.is_usable(self.ctx.now()),
            expires_at: invite.expires_at,
            remaining_uses: invite.remaining_uses(),
        })
    }

    /// Redeem an invite by code or link token
    ///
    /// Expiry, capacity, bans and existing membership are checked by the
    /// repository inside the same unit that inserts the member. A retry after
    /// a timeout fails with "already a member" instead of joining twice.
    #[instrument(skip(self, handle))]
    pub async fn redeem(
        &self,
        handle: &str,
        user_id: Snowflake,
    ) -> ServiceResult<RedeemInviteResponse> {
        let invite = self.find(handle).await?;
        let league = MembershipGuard::new(self.ctx)
            .league(invite.league_id)
            .await?;

        let now = self.ctx.now();
        let member = LeagueMember::new(
            self.ctx.generate_id(),
            league.id,
            user_id,
            MemberRole::Member,
            now,
        );

        let redeemed = match self.ctx.invite_repo().redeem(handle, &member, now).await {
            Ok(invite) => invite,
            Err(e) => {
                match &e {
                    DomainError::UserBanned => {
                        warn!(league_id = %league.id, user_id = %user_id, "Banned user tried to redeem invite");
                    }
                    DomainError::InviteExhausted | DomainError::InviteExpired => {
                        warn!(code = %invite.code, user_id = %user_id, error = %e, "Invite redemption refused");
                    }
                    _ => {}
                }
                return Err(e.into());
            }
        };

        info!(
            code = %redeemed.code,
            league_id = %league.id,
            user_id = %user_id,
            uses = redeemed.uses,
            "Invite redeemed"
        );

        let mut league_response = LeagueResponse::from(&league);
        league_response.my_role = Some(MemberRole::Member);
        Ok(RedeemInviteResponse {
            league: league_response,
            member: MemberResponse::from(&member),
        })
    }

    async fn find(&self, handle: &str) -> ServiceResult<Invite> {
        Ok(self
            .ctx
            .invite_repo()
            .find_by_handle(handle)
            .await?
            .ok_or_else(|| DomainError::InviteNotFound(handle.to_string()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestLeague;
    use crate::services::ModerationService;
    use crate::dto::ModerationRequest;

    #[tokio::test]
    async fn test_members_cannot_create_invites() {
        let league = TestLeague::new().await;
        let member = league.join().await;

        let err = InviteService::new(&league.ctx)
            .create_invite(league.id, member, CreateInviteRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InsufficientRole { .. })
        ));
    }

    #[tokio::test]
    async fn test_redeem_by_code_and_by_token() {
        let league = TestLeague::new().await;
        let service = InviteService::new(&league.ctx);
        let invite = service
            .create_invite(league.id, league.owner, CreateInviteRequest::default())
            .await
            .unwrap();
        assert_eq!(invite.code.len(), league.ctx.settings().invite_code_length);

        let (a, b) = (league.ctx.generate_id(), league.ctx.generate_id());
        service.redeem(&invite.code, a).await.unwrap();
        let joined = service.redeem(&invite.link_token, b).await.unwrap();
        assert_eq!(joined.member.role, MemberRole::Member);

        let listed = service.list_invites(league.id, league.owner).await.unwrap();
        assert_eq!(listed[0].uses, 2);
    }

    #[tokio::test]
    async fn test_retry_after_join_is_already_member() {
        let league = TestLeague::new().await;
        let service = InviteService::new(&league.ctx);
        let invite = service
            .create_invite(league.id, league.owner, CreateInviteRequest::default())
            .await
            .unwrap();

        let user = league.ctx.generate_id();
        service.redeem(&invite.code, user).await.unwrap();
        let err = service.redeem(&invite.code, user).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::AlreadyMember)));
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_concurrent_redeem_of_single_use_invite() {
        let league = TestLeague::new().await;
        let invite = InviteService::new(&league.ctx)
            .create_invite(
                league.id,
                league.owner,
                CreateInviteRequest {
                    max_uses: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let attempts = (0..2).map(|_| {
            let ctx = league.ctx.clone();
            let code = invite.code.clone();
            tokio::spawn(async move {
                let user = ctx.generate_id();
                InviteService::new(&ctx).redeem(&code, user).await
            })
        });
        let results: Vec<_> = futures::future::join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let failure = results.into_iter().find_map(Result::err).unwrap();
        assert!(matches!(failure.as_domain(), Some(DomainError::InviteExhausted)));

        let preview = InviteService::new(&league.ctx)
            .preview(&invite.link_token)
            .await
            .unwrap();
        assert_eq!(preview.member_count, 2);
        assert!(!preview.usable);
        assert_eq!(preview.remaining_uses, Some(0));
    }

    #[tokio::test]
    async fn test_expired_invite_is_refused() {
        let league = TestLeague::new().await;
        let service = InviteService::new(&league.ctx);
        let invite = service
            .create_invite(
                league.id,
                league.owner,
                CreateInviteRequest {
                    max_age: Some(60),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        league.clock.advance(Duration::seconds(61));
        let err = service
            .redeem(&invite.code, league.ctx.generate_id())
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::InviteExpired)));
    }

    #[tokio::test]
    async fn test_banned_user_redeem_is_forbidden() {
        let league = TestLeague::new().await;
        let target = league.ctx.generate_id();
        ModerationService::new(&league.ctx)
            .ban(league.id, league.owner, target, ModerationRequest::default())
            .await
            .unwrap();

        let invite = InviteService::new(&league.ctx)
            .create_invite(league.id, league.owner, CreateInviteRequest::default())
            .await
            .unwrap();
        let err = InviteService::new(&league.ctx)
            .redeem(&invite.code, target)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert!(matches!(err.as_domain(), Some(DomainError::UserBanned)));
    }

    #[tokio::test]
    async fn test_revoked_invite_is_not_found() {
        let league = TestLeague::new().await;
        let service = InviteService::new(&league.ctx);
        let invite = service
            .create_invite(league.id, league.owner, CreateInviteRequest::default())
            .await
            .unwrap();

        service.revoke_invite(&invite.code, league.owner).await.unwrap();
        let err = service
            .redeem(&invite.code, league.ctx.generate_id())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}

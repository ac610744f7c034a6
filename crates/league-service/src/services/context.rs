//! Service context - dependency container for services
//!
//! Holds all repositories, the projection cache, the clock and the other
//! dependencies needed by services.

use std::sync::Arc;

use league_common::auth::JwtService;
use league_common::LeagueConfig;
use league_core::traits::{
    Clock, CommentRepository, InviteRepository, LeagueRepository, MemberRepository,
    ModerationRepository, ProjectionCache, ReactionRepository, RoundRepository, SeasonRepository,
    SubmissionRepository, SystemClock, VoteRepository,
};
use league_core::{Snowflake, SnowflakeGenerator};
use league_db::{
    MemoryStore, PgCommentRepository, PgInviteRepository, PgLeagueRepository, PgMemberRepository,
    PgModerationRepository, PgPool, PgReactionRepository, PgRoundRepository,
    PgSubmissionRepository, PgVoteRepository, PgSeasonRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Repositories (Postgres or in-memory)
/// - The optional leaderboard projection cache
/// - JWT service for authentication
/// - The clock every deadline decision reads
/// - Snowflake generator for ID generation
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    league_repo: Arc<dyn LeagueRepository>,
    season_repo: Arc<dyn SeasonRepository>,
    member_repo: Arc<dyn MemberRepository>,
    invite_repo: Arc<dyn InviteRepository>,
    round_repo: Arc<dyn RoundRepository>,
    submission_repo: Arc<dyn SubmissionRepository>,
    vote_repo: Arc<dyn VoteRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    moderation_repo: Arc<dyn ModerationRepository>,

    // Cache
    projection_cache: Option<Arc<dyn ProjectionCache>>,

    // Services
    jwt_service: Arc<JwtService>,
    clock: Arc<dyn Clock>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    settings: LeagueConfig,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    /// Get the league repository
    pub fn league_repo(&self) -> &dyn LeagueRepository {
        self.league_repo.as_ref()
    }

    /// Get the season repository
    pub fn season_repo(&self) -> &dyn SeasonRepository {
        self.season_repo.as_ref()
    }

    /// Get the member repository
    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    /// Get the invite repository
    pub fn invite_repo(&self) -> &dyn InviteRepository {
        self.invite_repo.as_ref()
    }

    /// Get the round repository
    pub fn round_repo(&self) -> &dyn RoundRepository {
        self.round_repo.as_ref()
    }

    /// Get the submission repository
    pub fn submission_repo(&self) -> &dyn SubmissionRepository {
        self.submission_repo.as_ref()
    }

    /// Get the vote repository
    pub fn vote_repo(&self) -> &dyn VoteRepository {
        self.vote_repo.as_ref()
    }

    /// Get the reaction repository
    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    /// Get the comment repository
    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    /// Get the moderation repository
    pub fn moderation_repo(&self) -> &dyn ModerationRepository {
        self.moderation_repo.as_ref()
    }

    // === Cache ===

    /// Get the projection cache, if one is configured
    pub fn projection_cache(&self) -> Option<&dyn ProjectionCache> {
        self.projection_cache.as_deref()
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Get the clock
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Current time according to the configured clock
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Game-level settings
    pub fn settings(&self) -> &LeagueConfig {
        &self.settings
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("projection_cache", &self.projection_cache.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    league_repo: Option<Arc<dyn LeagueRepository>>,
    season_repo: Option<Arc<dyn SeasonRepository>>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    invite_repo: Option<Arc<dyn InviteRepository>>,
    round_repo: Option<Arc<dyn RoundRepository>>,
    submission_repo: Option<Arc<dyn SubmissionRepository>>,
    vote_repo: Option<Arc<dyn VoteRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    moderation_repo: Option<Arc<dyn ModerationRepository>>,
    projection_cache: Option<Arc<dyn ProjectionCache>>,
    jwt_service: Option<Arc<JwtService>>,
    clock: Option<Arc<dyn Clock>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    settings: LeagueConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            league_repo: None,
            season_repo: None,
            member_repo: None,
            invite_repo: None,
            round_repo: None,
            submission_repo: None,
            vote_repo: None,
            reaction_repo: None,
            comment_repo: None,
            moderation_repo: None,
            projection_cache: None,
            jwt_service: None,
            clock: None,
            snowflake_generator: None,
            settings: LeagueConfig::default(),
        }
    }

    /// Use one in-memory store for every repository
    pub fn memory_store(self, store: Arc<MemoryStore>) -> Self {
        self.league_repo(store.clone())
            .season_repo(store.clone())
            .member_repo(store.clone())
            .invite_repo(store.clone())
            .round_repo(store.clone())
            .submission_repo(store.clone())
            .vote_repo(store.clone())
            .reaction_repo(store.clone())
            .comment_repo(store.clone())
            .moderation_repo(store)
    }

    /// Use the Postgres repositories over one pool
    pub fn postgres(self, pool: PgPool) -> Self {
        self.league_repo(Arc::new(PgLeagueRepository::new(pool.clone())))
            .season_repo(Arc::new(PgSeasonRepository::new(pool.clone())))
            .member_repo(Arc::new(PgMemberRepository::new(pool.clone())))
            .invite_repo(Arc::new(PgInviteRepository::new(pool.clone())))
            .round_repo(Arc::new(PgRoundRepository::new(pool.clone())))
            .submission_repo(Arc::new(PgSubmissionRepository::new(pool.clone())))
            .vote_repo(Arc::new(PgVoteRepository::new(pool.clone())))
            .reaction_repo(Arc::new(PgReactionRepository::new(pool.clone())))
            .comment_repo(Arc::new(PgCommentRepository::new(pool.clone())))
            .moderation_repo(Arc::new(PgModerationRepository::new(pool)))
    }

    pub fn league_repo(mut self, repo: Arc<dyn LeagueRepository>) -> Self {
        self.league_repo = Some(repo);
        self
    }

    pub fn season_repo(mut self, repo: Arc<dyn SeasonRepository>) -> Self {
        self.season_repo = Some(repo);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn invite_repo(mut self, repo: Arc<dyn InviteRepository>) -> Self {
        self.invite_repo = Some(repo);
        self
    }

    pub fn round_repo(mut self, repo: Arc<dyn RoundRepository>) -> Self {
        self.round_repo = Some(repo);
        self
    }

    pub fn submission_repo(mut self, repo: Arc<dyn SubmissionRepository>) -> Self {
        self.submission_repo = Some(repo);
        self
    }

    pub fn vote_repo(mut self, repo: Arc<dyn VoteRepository>) -> Self {
        self.vote_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn moderation_repo(mut self, repo: Arc<dyn ModerationRepository>) -> Self {
        self.moderation_repo = Some(repo);
        self
    }

    pub fn projection_cache(mut self, cache: Arc<dyn ProjectionCache>) -> Self {
        self.projection_cache = Some(cache);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn settings(mut self, settings: LeagueConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Build the ServiceContext
    ///
    /// The clock defaults to the system clock and the generator to node 0.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            league_repo: required(self.league_repo, "league_repo")?,
            season_repo: required(self.season_repo, "season_repo")?,
            member_repo: required(self.member_repo, "member_repo")?,
            invite_repo: required(self.invite_repo, "invite_repo")?,
            round_repo: required(self.round_repo, "round_repo")?,
            submission_repo: required(self.submission_repo, "submission_repo")?,
            vote_repo: required(self.vote_repo, "vote_repo")?,
            reaction_repo: required(self.reaction_repo, "reaction_repo")?,
            comment_repo: required(self.comment_repo, "comment_repo")?,
            moderation_repo: required(self.moderation_repo, "moderation_repo")?,
            projection_cache: self.projection_cache,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            settings: self.settings,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! # league-core
//!
//! Domain layer for the music league: entities, the round lifecycle, the
//! tally engine, and the repository traits the infrastructure implements.
//! This crate has no dependency on databases, caches or web frameworks.

pub mod entities;
pub mod error;
pub mod lifecycle;
pub mod tally;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    generate_invite_code, generate_link_token, Comment, Invite, League, LeagueMember,
    LeagueSettings, ModerationAction, ModerationEffect, ModerationLogEntry, Reaction,
    ReactionCount, Round, RoundSchedule, Season, Submission, Track, Visibility, Vote,
};
pub use error::{DomainError, ErrorKind};
pub use traits::{
    Clock, CommentRepository, InviteRepository, LeagueRepository, ManualClock, MemberRepository,
    ModerationRepository, ProjectionCache, ReactionRepository, RepoResult, RoundRepository,
    SeasonRepository, SubmissionRepository, SystemClock, VoteRepository,
};
pub use value_objects::{
    can_transition, EmptyRoundPolicy, MemberRole, RoundActions, RoundStatus, ScoringMode,
    Snowflake, SnowflakeGenerator, SnowflakeParseError, VoteValue,
};

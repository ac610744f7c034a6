//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    AdvanceRoundRequest, CastVoteRequest, ChangeRoleRequest, CreateCommentRequest,
    CreateInviteRequest, CreateLeagueRequest, CreateRoundRequest, CreateSeasonRequest,
    LimitQuery, ModerationRequest, ScheduleRequest, SeasonQuery, SubmitTrackRequest,
    UpdateRoundRequest,
};

// Re-export commonly used response types
pub use responses::{
    BanResponse, CommentResponse, HealthResponse, InvitePreviewResponse, InviteResponse,
    LeaderboardResponse, LeagueResponse, MemberResponse, ModerationLogResponse,
    ReactionCountResponse, ReactionToggleResponse, RedeemInviteResponse, RoundResponse,
    RoundStandingsResponse, SeasonResponse, StandingResponse, SubmissionResponse, VoteResponse,
};

// Re-export mapper helper structs
pub use mappers::{RankedWithTrack, SubmissionView};

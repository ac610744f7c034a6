//! # league-service
//!
//! Application layer: the membership guard, league and round use cases, the
//! deadline scheduler, statistics and the request/response DTOs.

pub mod dto;
pub mod services;

pub use services::{
    InviteService, LeagueService, MembershipGuard, ModerationService, ReactionService,
    RoundScheduler, RoundService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, StatsService, SubmissionService, SweepReport, VoteService,
};

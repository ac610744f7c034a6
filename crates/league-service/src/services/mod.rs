//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod context;
pub mod error;
pub mod guard;
pub mod invite;
pub mod league;
pub mod moderation;
pub mod reaction;
pub mod round;
pub mod scheduler;
pub mod stats;
pub mod submission;
pub mod vote;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use guard::{can_moderate, MembershipGuard};
pub use invite::InviteService;
pub use league::LeagueService;
pub use moderation::ModerationService;
pub use reaction::ReactionService;
pub use round::RoundService;
pub use scheduler::{RoundScheduler, SweepReport};
pub use stats::StatsService;
pub use submission::SubmissionService;
pub use vote::VoteService;

use league_core::Snowflake;

/// Parse a Snowflake carried as a string in a request body or query
pub(crate) fn parse_id(field: &str, raw: &str) -> ServiceResult<Snowflake> {
    raw.parse()
        .map_err(|_| ServiceError::validation(format!("{field} is not a valid id")))
}

#[cfg(test)]
pub(crate) mod test_support;

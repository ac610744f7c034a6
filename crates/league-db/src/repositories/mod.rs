//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in league-core.
//! Operations the traits document as atomic run in a single transaction
//! that locks the rows its checks depend on.

mod error;
mod invite;
mod league;
mod member;
mod moderation;
mod reaction;
mod round;
mod season;
mod submission;
mod vote;

pub use invite::PgInviteRepository;
pub use league::PgLeagueRepository;
pub use member::PgMemberRepository;
pub use moderation::PgModerationRepository;
pub use reaction::{PgCommentRepository, PgReactionRepository};
pub use round::PgRoundRepository;
pub use season::PgSeasonRepository;
pub use submission::PgSubmissionRepository;
pub use vote::PgVoteRepository;

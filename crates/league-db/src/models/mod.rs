//! Database models - SQLx-compatible structs for PostgreSQL tables

mod invite;
mod league;
mod member;
mod moderation;
mod round;
mod submission;
mod vote;

pub use invite::InviteModel;
pub use league::{LeagueModel, SeasonModel};
pub use member::LeagueMemberModel;
pub use moderation::ModerationLogModel;
pub use round::RoundModel;
pub use submission::SubmissionModel;
pub use vote::{CommentModel, ReactionModel, VoteModel};

//! Domain entities - core business objects

mod invite;
mod league;
mod member;
mod moderation;
mod round;
mod submission;
mod vote;

pub use invite::{
    generate_invite_code, generate_link_token, Invite, DEFAULT_INVITE_CODE_LENGTH,
};
pub use league::{League, LeagueSettings, Season, Visibility, DEFAULT_MAX_POINTS_PER_VOTE};
pub use member::LeagueMember;
pub use moderation::{ModerationAction, ModerationEffect, ModerationLogEntry};
pub use round::{Round, RoundSchedule};
pub use submission::{Submission, Track};
pub use vote::{Comment, Reaction, ReactionCount, Vote, MAX_COMMENT_LENGTH};

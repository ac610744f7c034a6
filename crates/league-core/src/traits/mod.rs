//! Ports implemented by infrastructure crates

mod cache;
mod clock;
mod repositories;

pub use cache::ProjectionCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use repositories::{
    CommentRepository, InviteRepository, LeagueRepository, MemberRepository,
    ModerationRepository, ReactionRepository, RepoResult, RoundRepository, SeasonRepository,
    SubmissionRepository, VoteRepository,
};

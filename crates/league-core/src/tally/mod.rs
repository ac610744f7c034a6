//! Tally & leaderboard engine
//!
//! Pure functions over round, submission and vote history. Nothing here
//! touches storage, so every result can be recomputed at will.

mod controversy;
mod head_to_head;
mod round;
mod stats;

pub use controversy::{controversy_score, most_controversial, ControversialSubmission};
pub use head_to_head::{head_to_head, HeadToHead};
pub use round::{rank_order, RankedSubmission, RoundTally, RoundTallyBuilder, SubmissionScore};
pub use stats::{
    leaderboard, member_placements, member_stats, member_stats_from_tallies, GenreCount,
    LeaderboardRow, LeagueHistory, MemberStats, RoundPlacement,
};

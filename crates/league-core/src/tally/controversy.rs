//! Controversy ranking - surfaces the most divisive submissions

use serde::Serialize;

use super::round::RoundTally;
use crate::value_objects::Snowflake;

/// `min(up, down) * (up + down)`
///
/// Zero unless a submission drew both kinds of vote. Symmetric in its
/// arguments and non-decreasing in each.
#[inline]
pub fn controversy_score(upvotes: u32, downvotes: u32) -> u64 {
    u64::from(upvotes.min(downvotes)) * (u64::from(upvotes) + u64::from(downvotes))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControversialSubmission {
    pub submission_id: Snowflake,
    pub round_id: Snowflake,
    pub user_id: Snowflake,
    pub upvotes: u32,
    pub downvotes: u32,
    pub score: i64,
    pub controversy: u64,
}

/// Divisive submissions across tallies, most controversial first
pub fn most_controversial(tallies: &[RoundTally], limit: usize) -> Vec<ControversialSubmission> {
    let mut found: Vec<ControversialSubmission> = tallies
        .iter()
        .flat_map(|t| &t.entries)
        .map(|ranked| {
            let e = &ranked.entry;
            ControversialSubmission {
                submission_id: e.submission_id,
                round_id: e.round_id,
                user_id: e.user_id,
                upvotes: e.upvotes,
                downvotes: e.downvotes,
                score: e.score,
                controversy: controversy_score(e.upvotes, e.downvotes),
            }
        })
        .filter(|c| c.controversy > 0)
        .collect();

    found.sort_by(|a, b| {
        b.controversy
            .cmp(&a.controversy)
            .then_with(|| (b.upvotes + b.downvotes).cmp(&(a.upvotes + a.downvotes)))
            .then_with(|| a.submission_id.cmp(&b.submission_id))
    });
    found.truncate(limit);
    found
}

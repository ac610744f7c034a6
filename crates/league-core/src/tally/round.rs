//! Per-round tally and ranking
//!
//! Ranking order is score descending, then earliest `submitted_at`, then
//! lowest submission id. Placements are 1-based and never shared: two
//! submissions with equal scores still get distinct placements.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::entities::{Submission, Vote};
use crate::value_objects::{Snowflake, VoteValue};

/// Aggregated votes for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionScore {
    pub submission_id: Snowflake,
    pub round_id: Snowflake,
    pub user_id: Snowflake,
    pub submitted_at: DateTime<Utc>,
    pub score: i64,
    pub upvotes: u32,
    pub downvotes: u32,
    pub vote_count: u32,
}

impl SubmissionScore {
    fn empty(submission: &Submission) -> Self {
        Self {
            submission_id: submission.id,
            round_id: submission.round_id,
            user_id: submission.user_id,
            submitted_at: submission.submitted_at,
            score: 0,
            upvotes: 0,
            downvotes: 0,
            vote_count: 0,
        }
    }

    fn add(&mut self, value: VoteValue) {
        self.score += value.score();
        self.vote_count += 1;
        match value {
            VoteValue::Up => self.upvotes += 1,
            VoteValue::Down => self.downvotes += 1,
            VoteValue::Points { .. } => {}
        }
    }

    fn subtract(&mut self, value: VoteValue) {
        self.score -= value.score();
        self.vote_count = self.vote_count.saturating_sub(1);
        match value {
            VoteValue::Up => self.upvotes = self.upvotes.saturating_sub(1),
            VoteValue::Down => self.downvotes = self.downvotes.saturating_sub(1),
            VoteValue::Points { .. } => {}
        }
    }
}

/// Total order used for placements
pub fn rank_order(a: &SubmissionScore, b: &SubmissionScore) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        .then_with(|| a.submission_id.cmp(&b.submission_id))
}

/// A scored submission with its placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedSubmission {
    pub placement: u32,
    #[serde(flatten)]
    pub entry: SubmissionScore,
}

/// Ranked result of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTally {
    pub round_id: Snowflake,
    pub entries: Vec<RankedSubmission>,
}

impl RoundTally {
    /// Batch computation over the full vote log of a round
    pub fn compute(round_id: Snowflake, submissions: &[Submission], votes: &[Vote]) -> Self {
        let mut builder = RoundTallyBuilder::new(round_id, submissions);
        for vote in votes {
            builder.apply(vote);
        }
        builder.finish()
    }

    pub fn placement_of(&self, submission_id: Snowflake) -> Option<u32> {
        self.entries
            .iter()
            .find(|ranked| ranked.entry.submission_id == submission_id)
            .map(|ranked| ranked.placement)
    }

    pub fn winner(&self) -> Option<&RankedSubmission> {
        self.entries.first()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Incremental tally; [`RoundTallyBuilder::finish`] matches
/// [`RoundTally::compute`] over the same final vote set.
#[derive(Debug, Clone)]
pub struct RoundTallyBuilder {
    round_id: Snowflake,
    scores: HashMap<Snowflake, SubmissionScore>,
}

impl RoundTallyBuilder {
    pub fn new(round_id: Snowflake, submissions: &[Submission]) -> Self {
        let scores = submissions
            .iter()
            .filter(|s| s.round_id == round_id)
            .map(|s| (s.id, SubmissionScore::empty(s)))
            .collect();
        Self { round_id, scores }
    }

    fn target(&mut self, vote: &Vote) -> Option<&mut SubmissionScore> {
        if vote.round_id != self.round_id {
            return None;
        }
        // self-votes are rejected at write time and never count
        self.scores
            .get_mut(&vote.submission_id)
            .filter(|score| score.user_id != vote.voter_id)
    }

    /// Count a new vote. Returns false if it does not belong to this round.
    pub fn apply(&mut self, vote: &Vote) -> bool {
        match self.target(vote) {
            Some(score) => {
                score.add(vote.value);
                true
            }
            None => false,
        }
    }

    /// Remove a previously applied vote
    pub fn retract(&mut self, vote: &Vote) -> bool {
        match self.target(vote) {
            Some(score) => {
                score.subtract(vote.value);
                true
            }
            None => false,
        }
    }

    /// A voter changed their ballot
    pub fn replace(&mut self, previous: &Vote, current: &Vote) {
        self.retract(previous);
        self.apply(current);
    }

    pub fn finish(&self) -> RoundTally {
        let mut entries: Vec<SubmissionScore> = self.scores.values().cloned().collect();
        entries.sort_by(rank_order);

        RoundTally {
            round_id: self.round_id,
            entries: entries
                .into_iter()
                .zip(1u32..)
                .map(|(entry, placement)| RankedSubmission { placement, entry })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Track;
    use chrono::{Duration, TimeZone};
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    const ROUND: Snowflake = Snowflake::new(1);

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap()
    }

    fn submission(id: i64, user: i64, minute: i64) -> Submission {
        Submission::new(
            Snowflake::new(id),
            ROUND,
            Snowflake::new(99),
            Snowflake::new(user),
            Track {
                title: format!("track {id}"),
                artist: "artist".to_string(),
                album: None,
                external_id: None,
                genre: None,
            },
            base() + Duration::minutes(minute),
        )
    }

    fn vote(id: i64, submission: i64, voter: i64, value: VoteValue) -> Vote {
        Vote::new(
            Snowflake::new(id),
            ROUND,
            Snowflake::new(submission),
            Snowflake::new(voter),
            value,
            base(),
        )
    }

    fn points(id: i64, submission: i64, voter: i64, points: i32) -> Vote {
        vote(id, submission, voter, VoteValue::Points { points })
    }

    /// A=7 (submitted second), B=7 (submitted first), C=3
    fn tied_round() -> (Vec<Submission>, Vec<Vote>) {
        let submissions = vec![
            submission(10, 100, 5),
            submission(11, 101, 1),
            submission(12, 102, 9),
        ];
        let votes = vec![
            points(1, 10, 101, 4),
            points(2, 10, 102, 3),
            points(3, 11, 100, 5),
            points(4, 11, 102, 2),
            points(5, 12, 100, 1),
            points(6, 12, 101, 2),
        ];
        (submissions, votes)
    }

    #[test]
    fn test_tie_broken_by_earlier_submission() {
        let (submissions, votes) = tied_round();
        let tally = RoundTally::compute(ROUND, &submissions, &votes);

        let order: Vec<_> = tally
            .entries
            .iter()
            .map(|r| (r.entry.submission_id.into_inner(), r.entry.score, r.placement))
            .collect();
        assert_eq!(order, vec![(11, 7, 1), (10, 7, 2), (12, 3, 3)]);
    }

    #[test]
    fn test_tie_broken_by_id_when_timestamps_match() {
        let submissions = vec![submission(21, 100, 0), submission(20, 101, 0)];
        let tally = RoundTally::compute(ROUND, &submissions, &[]);
        assert_eq!(tally.placement_of(Snowflake::new(20)), Some(1));
        assert_eq!(tally.placement_of(Snowflake::new(21)), Some(2));
    }

    #[test]
    fn test_reaction_scores() {
        let submissions = vec![submission(10, 100, 0), submission(11, 101, 1)];
        let votes = vec![
            vote(1, 10, 101, VoteValue::Up),
            vote(2, 10, 102, VoteValue::Down),
            vote(3, 10, 103, VoteValue::Up),
            vote(4, 11, 100, VoteValue::Down),
        ];
        let tally = RoundTally::compute(ROUND, &submissions, &votes);
        let winner = tally.winner().unwrap();
        assert_eq!(winner.entry.submission_id, Snowflake::new(10));
        assert_eq!(winner.entry.score, 1);
        assert_eq!((winner.entry.upvotes, winner.entry.downvotes), (2, 1));
        assert_eq!(tally.entries[1].entry.score, -1);
    }

    #[test]
    fn test_recompute_is_stable_and_order_independent() {
        let (submissions, votes) = tied_round();
        let expected = RoundTally::compute(ROUND, &submissions, &votes);
        assert_eq!(expected, RoundTally::compute(ROUND, &submissions, &votes));

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let mut shuffled = votes.clone();
            shuffled.shuffle(&mut rng);
            let mut subs = submissions.clone();
            subs.shuffle(&mut rng);
            assert_eq!(RoundTally::compute(ROUND, &subs, &shuffled), expected);
        }
    }

    #[test]
    fn test_incremental_matches_batch() {
        let (submissions, votes) = tied_round();

        let mut builder = RoundTallyBuilder::new(ROUND, &submissions);
        // voter 102 first gives C five points, then changes their mind
        let first = points(4, 11, 102, 5);
        builder.apply(&first);
        for v in &votes {
            if v.id != first.id {
                builder.apply(v);
            }
        }
        builder.replace(&first, &votes[3]);

        // a stray vote that is later retracted leaves no trace
        let stray = points(7, 12, 103, 5);
        builder.apply(&stray);
        builder.retract(&stray);

        assert_eq!(
            builder.finish(),
            RoundTally::compute(ROUND, &submissions, &votes)
        );
    }

    #[test]
    fn test_foreign_and_self_votes_ignored() {
        let submissions = vec![submission(10, 100, 0)];
        let mut foreign = points(1, 10, 101, 5);
        foreign.round_id = Snowflake::new(2);
        let own = points(2, 10, 100, 5);
        let unknown = points(3, 77, 101, 5);

        let mut builder = RoundTallyBuilder::new(ROUND, &submissions);
        assert!(!builder.apply(&foreign));
        assert!(!builder.apply(&own));
        assert!(!builder.apply(&unknown));
        assert_eq!(builder.finish().entries[0].entry.score, 0);
    }
}

//! Member statistics and leaderboards derived from round history
//!
//! Only revealed and archived rounds count. Everything here is a pure
//! function of rounds, submissions and votes; any stored copy is a cache.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::round::RoundTally;
use crate::entities::{Round, Submission, Vote};
use crate::value_objects::Snowflake;

const FAVORITE_GENRE_LIMIT: usize = 5;

/// Raw history of a league (or one season of it)
#[derive(Debug, Clone, Copy)]
pub struct LeagueHistory<'a> {
    pub rounds: &'a [Round],
    pub submissions: &'a [Submission],
    pub votes: &'a [Vote],
}

impl<'a> LeagueHistory<'a> {
    pub fn new(rounds: &'a [Round], submissions: &'a [Submission], votes: &'a [Vote]) -> Self {
        Self {
            rounds,
            submissions,
            votes,
        }
    }

    /// Rounds whose results are public, by id
    pub fn counted_rounds(&self) -> impl Iterator<Item = &'a Round> {
        self.rounds.iter().filter(|r| r.status.is_revealed())
    }

    /// Batch tally of every counted round, ordered by round id
    pub fn tallies(&self) -> Vec<RoundTally> {
        let mut submissions_by_round: HashMap<Snowflake, Vec<Submission>> = HashMap::new();
        for submission in self.submissions {
            submissions_by_round
                .entry(submission.round_id)
                .or_default()
                .push(submission.clone());
        }
        let mut votes_by_round: HashMap<Snowflake, Vec<Vote>> = HashMap::new();
        for vote in self.votes {
            votes_by_round
                .entry(vote.round_id)
                .or_default()
                .push(vote.clone());
        }

        let mut tallies: Vec<RoundTally> = self
            .counted_rounds()
            .map(|round| {
                RoundTally::compute(
                    round.id,
                    submissions_by_round
                        .get(&round.id)
                        .map_or(&[][..], Vec::as_slice),
                    votes_by_round.get(&round.id).map_or(&[][..], Vec::as_slice),
                )
            })
            .collect();
        tallies.sort_by_key(|t| t.round_id);
        tallies
    }
}

/// A member's best placement in one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundPlacement {
    pub round_id: Snowflake,
    pub user_id: Snowflake,
    pub placement: u32,
    pub score: i64,
}

/// Best placement per (round, member), ordered by round then placement
pub fn member_placements(tallies: &[RoundTally]) -> Vec<RoundPlacement> {
    let mut placements = Vec::new();
    for tally in tallies {
        let mut best: BTreeMap<Snowflake, RoundPlacement> = BTreeMap::new();
        for ranked in &tally.entries {
            // entries are already in placement order; the first hit is the best
            best.entry(ranked.entry.user_id)
                .or_insert_with(|| RoundPlacement {
                    round_id: tally.round_id,
                    user_id: ranked.entry.user_id,
                    placement: ranked.placement,
                    score: ranked.entry.score,
                });
        }
        let mut round: Vec<_> = best.into_values().collect();
        round.sort_by_key(|p| p.placement);
        placements.extend(round);
    }
    placements
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: u32,
}

/// Aggregate statistics for one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStats {
    pub user_id: Snowflake,
    pub total_points: i64,
    pub wins: u32,
    pub rounds_played: u32,
    pub avg_placement: Option<f64>,
    pub upvotes_received: u32,
    pub downvotes_received: u32,
    pub submissions: u32,
    pub votes_cast: u32,
    pub favorite_genres: Vec<GenreCount>,
}

impl MemberStats {
    pub fn empty(user_id: Snowflake) -> Self {
        Self {
            user_id,
            total_points: 0,
            wins: 0,
            rounds_played: 0,
            avg_placement: None,
            upvotes_received: 0,
            downvotes_received: 0,
            submissions: 0,
            votes_cast: 0,
            favorite_genres: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    #[serde(flatten)]
    pub stats: MemberStats,
}

/// Statistics for every member that appears in the counted history.
///
/// `tallies` may come from [`LeagueHistory::tallies`] or from incremental
/// builders; identical tallies give identical statistics.
pub fn member_stats_from_tallies(
    tallies: &[RoundTally],
    history: &LeagueHistory<'_>,
) -> BTreeMap<Snowflake, MemberStats> {
    let mut stats: BTreeMap<Snowflake, MemberStats> = BTreeMap::new();
    let mut placement_sums: HashMap<Snowflake, u64> = HashMap::new();
    let mut genres: HashMap<Snowflake, HashMap<String, u32>> = HashMap::new();

    for ranked in tallies.iter().flat_map(|t| &t.entries) {
        let entry = &ranked.entry;
        let member = stats
            .entry(entry.user_id)
            .or_insert_with(|| MemberStats::empty(entry.user_id));
        member.total_points += entry.score;
        member.upvotes_received += entry.upvotes;
        member.downvotes_received += entry.downvotes;
        member.submissions += 1;
    }

    for placement in member_placements(tallies) {
        let member = stats
            .entry(placement.user_id)
            .or_insert_with(|| MemberStats::empty(placement.user_id));
        member.rounds_played += 1;
        if placement.placement == 1 {
            member.wins += 1;
        }
        *placement_sums.entry(placement.user_id).or_default() += u64::from(placement.placement);
    }

    let counted: HashMap<Snowflake, &RoundTally> =
        tallies.iter().map(|t| (t.round_id, t)).collect();

    for submission in history.submissions {
        if !counted.contains_key(&submission.round_id) {
            continue;
        }
        if let Some(genre) = submission
            .track
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
        {
            *genres
                .entry(submission.user_id)
                .or_default()
                .entry(genre.to_lowercase())
                .or_default() += 1;
        }
    }

    for vote in history.votes {
        let Some(tally) = counted.get(&vote.round_id) else {
            continue;
        };
        let counts = tally.entries.iter().any(|ranked| {
            ranked.entry.submission_id == vote.submission_id
                && ranked.entry.user_id != vote.voter_id
        });
        if counts {
            stats
                .entry(vote.voter_id)
                .or_insert_with(|| MemberStats::empty(vote.voter_id))
                .votes_cast += 1;
        }
    }

    for member in stats.values_mut() {
        if member.rounds_played > 0 {
            let sum = placement_sums.get(&member.user_id).copied().unwrap_or(0);
            member.avg_placement = Some(sum as f64 / f64::from(member.rounds_played));
        }
        if let Some(counts) = genres.remove(&member.user_id) {
            let mut ranked: Vec<GenreCount> = counts
                .into_iter()
                .map(|(genre, count)| GenreCount { genre, count })
                .collect();
            ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
            ranked.truncate(FAVORITE_GENRE_LIMIT);
            member.favorite_genres = ranked;
        }
    }

    stats
}

/// Batch statistics over a history
pub fn member_stats(history: &LeagueHistory<'_>) -> BTreeMap<Snowflake, MemberStats> {
    member_stats_from_tallies(&history.tallies(), history)
}

/// Ranked leaderboard: points, then wins, then average placement, then
/// user id.
///
/// Only entrants are ranked. Members who voted but never had a counted
/// submission keep their [`MemberStats`] and stay off the board.
pub fn leaderboard(stats: impl IntoIterator<Item = MemberStats>) -> Vec<LeaderboardRow> {
    let mut rows: Vec<MemberStats> = stats
        .into_iter()
        .filter(|member| member.rounds_played > 0)
        .collect();
    rows.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| b.wins.cmp(&a.wins))
            .then_with(|| {
                let a_avg = a.avg_placement.unwrap_or(f64::INFINITY);
                let b_avg = b.avg_placement.unwrap_or(f64::INFINITY);
                a_avg.total_cmp(&b_avg)
            })
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    rows.into_iter()
        .zip(1u32..)
        .map(|(stats, rank)| LeaderboardRow { rank, stats })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Track;
    use crate::tally::RoundTallyBuilder;
    use crate::value_objects::{RoundStatus, VoteValue};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const LEAGUE: Snowflake = Snowflake::new(900);
    const ALICE: Snowflake = Snowflake::new(1);
    const BOB: Snowflake = Snowflake::new(2);
    const CARA: Snowflake = Snowflake::new(3);

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap()
    }

    fn round(id: i64, status: RoundStatus) -> Round {
        let mut r = Round::new(Snowflake::new(id), LEAGUE, format!("theme {id}"), ALICE, t0());
        r.status = status;
        r
    }

    fn sub(id: i64, round: i64, user: Snowflake, genre: Option<&str>, minute: i64) -> Submission {
        Submission::new(
            Snowflake::new(id),
            Snowflake::new(round),
            LEAGUE,
            user,
            Track {
                title: format!("song {id}"),
                artist: "band".to_string(),
                album: None,
                external_id: None,
                genre: genre.map(str::to_string),
            },
            t0() + Duration::minutes(minute),
        )
    }

    fn pts(id: i64, round: i64, submission: i64, voter: Snowflake, points: i32) -> Vote {
        Vote::new(
            Snowflake::new(id),
            Snowflake::new(round),
            Snowflake::new(submission),
            voter,
            VoteValue::Points { points },
            t0(),
        )
    }

    struct Fixture {
        rounds: Vec<Round>,
        submissions: Vec<Submission>,
        votes: Vec<Vote>,
    }

    fn fixture() -> Fixture {
        Fixture {
            rounds: vec![
                round(10, RoundStatus::Revealed),
                round(11, RoundStatus::Archived),
                round(12, RoundStatus::Voting),
            ],
            submissions: vec![
                // round 10: alice 5, bob 3, cara 1
                sub(100, 10, ALICE, Some("Shoegaze"), 0),
                sub(101, 10, BOB, Some("jazz"), 1),
                sub(102, 10, CARA, None, 2),
                // round 11: bob 6, alice 2
                sub(110, 11, BOB, Some("Jazz"), 0),
                sub(111, 11, ALICE, Some("shoegaze"), 1),
                // round 12 is still voting and must not count
                sub(120, 12, CARA, Some("metal"), 0),
            ],
            votes: vec![
                pts(1, 10, 100, BOB, 3),
                pts(2, 10, 100, CARA, 2),
                pts(3, 10, 101, ALICE, 3),
                pts(4, 10, 102, ALICE, 1),
                pts(5, 11, 110, ALICE, 4),
                pts(6, 11, 110, CARA, 2),
                pts(7, 11, 111, BOB, 2),
                pts(8, 12, 120, ALICE, 5),
            ],
        }
    }

    #[test]
    fn test_member_stats() {
        let f = fixture();
        let history = LeagueHistory::new(&f.rounds, &f.submissions, &f.votes);
        let stats = member_stats(&history);

        let alice = &stats[&ALICE];
        assert_eq!(alice.total_points, 7);
        assert_eq!(alice.wins, 1);
        assert_eq!(alice.rounds_played, 2);
        assert_eq!(alice.avg_placement, Some(1.5));
        assert_eq!(alice.submissions, 2);
        assert_eq!(alice.votes_cast, 3, "vote in unrevealed round excluded");
        assert_eq!(
            alice.favorite_genres,
            vec![GenreCount {
                genre: "shoegaze".to_string(),
                count: 2
            }]
        );

        let bob = &stats[&BOB];
        assert_eq!(bob.total_points, 9);
        assert_eq!(bob.wins, 1);
        assert_eq!(bob.avg_placement, Some(1.5));

        let cara = &stats[&CARA];
        assert_eq!(cara.total_points, 1);
        assert_eq!(cara.rounds_played, 1);
        assert_eq!(cara.submissions, 1);
        assert!(cara.favorite_genres.is_empty());
    }

    #[test]
    fn test_leaderboard_order() {
        let f = fixture();
        let history = LeagueHistory::new(&f.rounds, &f.submissions, &f.votes);
        let board = leaderboard(member_stats(&history).into_values());

        let order: Vec<_> = board.iter().map(|r| (r.rank, r.stats.user_id)).collect();
        assert_eq!(order, vec![(1, BOB), (2, ALICE), (3, CARA)]);
    }

    #[test]
    fn test_leaderboard_tie_breaks() {
        let mut a = MemberStats::empty(Snowflake::new(5));
        a.total_points = 10;
        a.wins = 1;
        a.rounds_played = 2;
        a.avg_placement = Some(2.0);
        let mut b = a.clone();
        b.user_id = Snowflake::new(4);
        b.avg_placement = Some(1.5);
        let mut c = a.clone();
        c.user_id = Snowflake::new(3);
        c.wins = 2;
        let mut d = a.clone();
        d.user_id = Snowflake::new(6);

        let board = leaderboard(vec![a, b, c, d]);
        let ids: Vec<_> = board.iter().map(|r| r.stats.user_id.into_inner()).collect();
        assert_eq!(ids, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_incremental_tallies_give_same_stats() {
        let f = fixture();
        let history = LeagueHistory::new(&f.rounds, &f.submissions, &f.votes);

        let mut incremental: Vec<RoundTally> = history
            .counted_rounds()
            .map(|round| {
                let mut builder = RoundTallyBuilder::new(round.id, &f.submissions);
                for vote in f.votes.iter().rev() {
                    builder.apply(vote);
                }
                builder.finish()
            })
            .collect();
        incremental.sort_by_key(|t| t.round_id);

        assert_eq!(
            member_stats_from_tallies(&incremental, &history),
            member_stats(&history)
        );
    }

    #[test]
    fn test_multiple_submissions_use_best_placement() {
        let rounds = vec![round(10, RoundStatus::Revealed)];
        let submissions = vec![
            sub(100, 10, ALICE, None, 0),
            sub(101, 10, ALICE, None, 1),
            sub(102, 10, BOB, None, 2),
        ];
        let votes = vec![pts(1, 10, 101, BOB, 5), pts(2, 10, 102, ALICE, 3)];
        let history = LeagueHistory::new(&rounds, &submissions, &votes);

        let placements = member_placements(&history.tallies());
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].user_id, ALICE);
        assert_eq!(placements[0].placement, 1);
        assert_eq!(placements[1].placement, 2);

        let stats = member_stats(&history);
        assert_eq!(stats[&ALICE].rounds_played, 1);
        assert_eq!(stats[&ALICE].submissions, 2);
        assert_eq!(stats[&ALICE].total_points, 5);
    }

    #[test]
    fn test_voters_without_entries_stay_off_the_board() {
        const DAVE: Snowflake = Snowflake::new(4);
        let rounds = vec![round(10, RoundStatus::Revealed)];
        let submissions = vec![sub(100, 10, ALICE, None, 0), sub(101, 10, BOB, None, 1)];
        let votes = vec![pts(1, 10, 100, DAVE, 4), pts(2, 10, 101, DAVE, 2)];
        let history = LeagueHistory::new(&rounds, &submissions, &votes);

        let stats = member_stats(&history);
        assert_eq!(stats[&DAVE].votes_cast, 2);
        assert_eq!(stats[&DAVE].rounds_played, 0);

        let board = leaderboard(stats.into_values());
        let ids: Vec<_> = board.iter().map(|r| r.stats.user_id).collect();
        assert_eq!(ids, vec![ALICE, BOB]);
        assert_eq!(board[1].rank, 2);
    }
}

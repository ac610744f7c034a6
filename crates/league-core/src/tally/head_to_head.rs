//! Head-to-head comparison between two members

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::stats::RoundPlacement;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadToHead {
    pub user1_id: Snowflake,
    pub user2_id: Snowflake,
    pub user1_wins: u32,
    pub user2_wins: u32,
    pub ties: u32,
    pub common_rounds: u32,
}

/// Compare two members over the rounds both entered.
///
/// A round is a tie when both members' best submissions scored the same,
/// even though placements are always distinct. Otherwise the better
/// placement wins the round.
pub fn head_to_head(
    placements: &[RoundPlacement],
    user1: Snowflake,
    user2: Snowflake,
) -> HeadToHead {
    let of = |user: Snowflake| -> HashMap<Snowflake, &RoundPlacement> {
        placements
            .iter()
            .filter(|p| p.user_id == user)
            .map(|p| (p.round_id, p))
            .collect()
    };
    let first = of(user1);
    let second = of(user2);

    let mut result = HeadToHead {
        user1_id: user1,
        user2_id: user2,
        user1_wins: 0,
        user2_wins: 0,
        ties: 0,
        common_rounds: 0,
    };
    if user1 == user2 {
        return result;
    }

    for (round_id, a) in &first {
        let Some(b) = second.get(round_id) else {
            continue;
        };
        result.common_rounds += 1;
        if a.score == b.score {
            result.ties += 1;
            continue;
        }
        match a.placement.cmp(&b.placement) {
            Ordering::Less => result.user1_wins += 1,
            Ordering::Greater => result.user2_wins += 1,
            Ordering::Equal => result.ties += 1,
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(round: i64, user: i64, placement: u32, score: i64) -> RoundPlacement {
        RoundPlacement {
            round_id: Snowflake::new(round),
            user_id: Snowflake::new(user),
            placement,
            score,
        }
    }

    #[test]
    fn test_five_shared_rounds() {
        let placements = vec![
            p(1, 10, 1, 9),
            p(1, 20, 2, 4),
            p(2, 10, 1, 8),
            p(2, 20, 3, 2),
            p(3, 20, 1, 6),
            p(3, 10, 2, 5),
            p(4, 20, 1, 7),
            p(4, 10, 2, 3),
            // equal scores, distinct placements: a tie
            p(5, 10, 1, 7),
            p(5, 20, 2, 7),
            // round only one of them entered
            p(6, 10, 1, 9),
            p(6, 30, 2, 1),
        ];

        let h2h = head_to_head(&placements, Snowflake::new(10), Snowflake::new(20));
        assert_eq!(h2h.user1_wins, 2);
        assert_eq!(h2h.user2_wins, 2);
        assert_eq!(h2h.ties, 1);
        assert_eq!(h2h.common_rounds, 5);

        let flipped = head_to_head(&placements, Snowflake::new(20), Snowflake::new(10));
        assert_eq!((flipped.user1_wins, flipped.user2_wins), (2, 2));
    }

    #[test]
    fn test_no_common_rounds() {
        let placements = vec![p(1, 10, 1, 3), p(2, 20, 1, 3)];
        let h2h = head_to_head(&placements, Snowflake::new(10), Snowflake::new(20));
        assert_eq!(h2h.common_rounds, 0);
        assert_eq!(h2h.ties, 0);
    }

    #[test]
    fn test_self_comparison_is_empty() {
        let placements = vec![p(1, 10, 1, 3)];
        let h2h = head_to_head(&placements, Snowflake::new(10), Snowflake::new(10));
        assert_eq!(h2h.common_rounds, 0);
    }
}

//! Deadline sweep planning
//!
//! Given a round, its submission count and the league policy, decide what the
//! scheduler should do. Execution (the compare-and-swap) belongs to the
//! repository; this module only plans.

use chrono::{DateTime, Duration, Utc};

use crate::entities::{Round, RoundSchedule};
use crate::error::DomainError;
use crate::value_objects::{EmptyRoundPolicy, RoundStatus};

/// Scheduler action for one due round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDecision {
    /// Move along the forward edge
    Advance { from: RoundStatus, to: RoundStatus },
    /// Push deadlines out; status stays `submitting`
    Extend(RoundSchedule),
    /// Leave the round where it is
    Hold,
}

/// A held round: its submission window closed without an entry and the
/// league waits for one instead of extending. Held rounds still accept the
/// first submission and are not due until they get one.
pub fn is_held(
    round: &Round,
    submission_count: usize,
    policy: EmptyRoundPolicy,
    now: DateTime<Utc>,
) -> bool {
    round.status == RoundStatus::Submitting
        && submission_count == 0
        && policy == EmptyRoundPolicy::Hold
        && round.due_transition(now).is_some()
}

/// Plan the automatic transition for `round`, or `None` if nothing is due
pub fn plan(
    round: &Round,
    submission_count: usize,
    policy: EmptyRoundPolicy,
    now: DateTime<Utc>,
) -> Result<Option<SweepDecision>, DomainError> {
    let Some(to) = round.due_transition(now) else {
        return Ok(None);
    };

    if round.status == RoundStatus::Submitting && submission_count == 0 {
        return Ok(Some(match policy {
            EmptyRoundPolicy::Hold => SweepDecision::Hold,
            EmptyRoundPolicy::Extend { seconds } => SweepDecision::Extend(
                round
                    .schedule
                    .extend_submission(now, Duration::seconds(seconds))?,
            ),
        }));
    }

    Ok(Some(SweepDecision::Advance {
        from: round.status,
        to,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Snowflake;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()
    }

    fn submitting_round() -> Round {
        let mut round = Round::new(
            Snowflake::new(1),
            Snowflake::new(2),
            "B-sides".to_string(),
            Snowflake::new(3),
            now() - Duration::days(3),
        )
        .with_schedule(RoundSchedule {
            submission_end: Some(now() - Duration::hours(1)),
            voting_end: Some(now() + Duration::days(1)),
            ..RoundSchedule::default()
        });
        round.status = RoundStatus::Submitting;
        round
    }

    #[test]
    fn test_advance_with_entries() {
        assert_eq!(
            plan(&submitting_round(), 3, EmptyRoundPolicy::Hold, now()).unwrap(),
            Some(SweepDecision::Advance {
                from: RoundStatus::Submitting,
                to: RoundStatus::Voting
            })
        );
    }

    #[test]
    fn test_hold_empty_round() {
        assert_eq!(
            plan(&submitting_round(), 0, EmptyRoundPolicy::Hold, now()).unwrap(),
            Some(SweepDecision::Hold)
        );
    }

    #[test]
    fn test_extend_empty_round() {
        let decision = plan(
            &submitting_round(),
            0,
            EmptyRoundPolicy::Extend { seconds: 3600 },
            now(),
        )
        .unwrap();
        let Some(SweepDecision::Extend(schedule)) = decision else {
            panic!("expected extension, got {decision:?}");
        };
        assert_eq!(schedule.submission_end, Some(now() + Duration::hours(1)));
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_nothing_due() {
        let round = submitting_round();
        assert_eq!(
            plan(&round, 1, EmptyRoundPolicy::Hold, now() - Duration::days(1)).unwrap(),
            None
        );
    }

    #[test]
    fn test_voting_reveals_even_without_votes() {
        let mut round = submitting_round();
        round.status = RoundStatus::Voting;
        assert_eq!(
            plan(&round, 0, EmptyRoundPolicy::Hold, now() + Duration::days(2)).unwrap(),
            Some(SweepDecision::Advance {
                from: RoundStatus::Voting,
                to: RoundStatus::Revealed
            })
        );
    }

    #[test]
    fn test_overflowing_extension_is_an_error() {
        let decision = plan(
            &submitting_round(),
            0,
            EmptyRoundPolicy::Extend {
                seconds: 1_000_000_000_000_000,
            },
            now(),
        );
        assert!(matches!(decision, Err(DomainError::InvalidSchedule(_))));
    }

    #[test]
    fn test_held_only_when_empty_and_overdue() {
        let round = submitting_round();
        assert!(is_held(&round, 0, EmptyRoundPolicy::Hold, now()));
        assert!(!is_held(&round, 1, EmptyRoundPolicy::Hold, now()));
        assert!(!is_held(
            &round,
            0,
            EmptyRoundPolicy::Extend { seconds: 60 },
            now()
        ));
        assert!(!is_held(
            &round,
            0,
            EmptyRoundPolicy::Hold,
            now() - Duration::days(1)
        ));
    }
}

//! Phase gate - decides whether a write is legal against a round right now
//!
//! The gate is pure: it reads the round's status, its deadlines and the
//! supplied clock reading. A deadline that has passed closes its window even
//! if the sweep has not yet moved the round along.

use chrono::{DateTime, Utc};

use crate::entities::Round;
use crate::error::DomainError;
use crate::value_objects::RoundActions;

/// Fail unless `action` is legal for `round` at `now`
pub fn ensure_action(
    round: &Round,
    action: RoundActions,
    now: DateTime<Utc>,
) -> Result<(), DomainError> {
    if !round.status.allowed_actions().contains(action) {
        return Err(DomainError::ActionNotAllowed {
            action: action.label(),
            status: round.status,
        });
    }

    let schedule = &round.schedule;
    if action == RoundActions::SUBMIT {
        if schedule.submission_start.is_some_and(|start| now < start) {
            return Err(DomainError::SubmissionsNotOpen);
        }
        if schedule.submission_end.is_some_and(|end| now >= end) {
            return Err(DomainError::SubmissionsClosed);
        }
    } else if action == RoundActions::VOTE {
        if schedule.voting_start.is_some_and(|start| now < start) {
            return Err(DomainError::VotingNotOpen);
        }
        if schedule.voting_end.is_some_and(|end| now >= end) {
            return Err(DomainError::VotingClosed);
        }
    }
    Ok(())
}

/// Gate for new submissions. A held round (see [`super::is_held`]) takes
/// submissions past its deadline; the next settle then moves it to voting.
pub fn ensure_submission(round: &Round, held: bool, now: DateTime<Utc>) -> Result<(), DomainError> {
    match ensure_action(round, RoundActions::SUBMIT, now) {
        Err(DomainError::SubmissionsClosed) if held => Ok(()),
        result => result,
    }
}

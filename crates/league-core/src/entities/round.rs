//! Round entity - one theme cycle of submit, vote, reveal

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{RoundStatus, Snowflake};

/// Phase boundaries of a round. A missing boundary disables the automatic
/// transition it would trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoundSchedule {
    pub submission_start: Option<DateTime<Utc>>,
    pub submission_end: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
}

impl RoundSchedule {
    fn boundaries(&self) -> [(&'static str, Option<DateTime<Utc>>); 4] {
        [
            ("submission_start", self.submission_start),
            ("submission_end", self.submission_end),
            ("voting_start", self.voting_start),
            ("voting_end", self.voting_end),
        ]
    }

    /// Present boundaries must be non-decreasing in lifecycle order
    pub fn validate(&self) -> Result<(), DomainError> {
        let present: Vec<_> = self
            .boundaries()
            .into_iter()
            .filter_map(|(name, at)| at.map(|at| (name, at)))
            .collect();

        for pair in present.windows(2) {
            let (earlier_name, earlier) = pair[0];
            let (later_name, later) = pair[1];
            if later < earlier {
                return Err(DomainError::InvalidSchedule(format!(
                    "{later_name} must not be before {earlier_name}"
                )));
            }
        }
        Ok(())
    }

    /// Move the submission deadline to `now + extension`, shifting later
    /// boundaries by the same amount so ordering is preserved.
    ///
    /// Fails instead of overflowing when a boundary would leave chrono's range.
    pub fn extend_submission(
        &self,
        now: DateTime<Utc>,
        extension: Duration,
    ) -> Result<Self, DomainError> {
        let out_of_range =
            || DomainError::InvalidSchedule("extended deadline is out of range".to_string());

        let new_end = now.checked_add_signed(extension).ok_or_else(out_of_range)?;
        let delta = self
            .submission_end
            .map_or(Duration::zero(), |end| (new_end - end).max(Duration::zero()));
        let shift = |at: Option<DateTime<Utc>>| {
            at.map(|at| at.checked_add_signed(delta).ok_or_else(out_of_range))
                .transpose()
        };

        Ok(Self {
            submission_start: self.submission_start,
            submission_end: Some(new_end),
            voting_start: shift(self.voting_start)?,
            voting_end: shift(self.voting_end)?,
        })
    }
}

/// Round entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub id: Snowflake,
    pub league_id: Snowflake,
    pub season_id: Option<Snowflake>,
    pub theme: String,
    pub description: Option<String>,
    pub status: RoundStatus,
    pub schedule: RoundSchedule,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Round {
    pub fn new(
        id: Snowflake,
        league_id: Snowflake,
        theme: String,
        created_by: Snowflake,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            league_id,
            season_id: None,
            theme,
            description: None,
            status: RoundStatus::Draft,
            schedule: RoundSchedule::default(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_schedule(mut self, schedule: RoundSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_season(mut self, season_id: Option<Snowflake>) -> Self {
        self.season_id = season_id;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Deadline-driven transition that is due at `now`, if any
    pub fn due_transition(&self, now: DateTime<Utc>) -> Option<RoundStatus> {
        match self.status {
            RoundStatus::Submitting => self
                .schedule
                .submission_end
                .filter(|end| *end <= now)
                .map(|_| RoundStatus::Voting),
            RoundStatus::Voting => self
                .schedule
                .voting_end
                .filter(|end| *end <= now)
                .map(|_| RoundStatus::Revealed),
            _ => None,
        }
    }
}

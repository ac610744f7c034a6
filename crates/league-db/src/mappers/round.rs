//! Round entity <-> model mapper

use chrono::{DateTime, Utc};
use league_core::entities::{Round, RoundSchedule};
use league_core::error::DomainError;
use league_core::value_objects::Snowflake;

use super::parse_column;
use crate::models::RoundModel;

impl TryFrom<RoundModel> for Round {
    type Error = DomainError;

    fn try_from(model: RoundModel) -> Result<Self, Self::Error> {
        Ok(Round {
            id: Snowflake::new(model.id),
            league_id: Snowflake::new(model.league_id),
            season_id: model.season_id.map(Snowflake::new),
            theme: model.theme,
            description: model.description,
            status: parse_column("status", &model.status)?,
            schedule: RoundSchedule {
                submission_start: model.submission_start,
                submission_end: model.submission_end,
                voting_start: model.voting_start,
                voting_end: model.voting_end,
            },
            created_by: Snowflake::new(model.created_by),
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Round columns ready for binding
pub struct RoundInsert<'a> {
    pub id: i64,
    pub league_id: i64,
    pub season_id: Option<i64>,
    pub theme: &'a str,
    pub description: Option<&'a str>,
    pub status: &'static str,
    pub submission_start: Option<DateTime<Utc>>,
    pub submission_end: Option<DateTime<Utc>>,
    pub voting_start: Option<DateTime<Utc>>,
    pub voting_end: Option<DateTime<Utc>>,
    pub created_by: i64,
}

impl<'a> RoundInsert<'a> {
    pub fn new(round: &'a Round) -> Self {
        Self {
            id: round.id.into_inner(),
            league_id: round.league_id.into_inner(),
            season_id: round.season_id.map(Snowflake::into_inner),
            theme: &round.theme,
            description: round.description.as_deref(),
            status: round.status.as_str(),
            submission_start: round.schedule.submission_start,
            submission_end: round.schedule.submission_end,
            voting_start: round.schedule.voting_start,
            voting_end: round.schedule.voting_end,
            created_by: round.created_by.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::value_objects::RoundStatus;

    #[test]
    fn test_round_from_row() {
        let now = Utc::now();
        let model = RoundModel {
            id: 10,
            league_id: 1,
            season_id: None,
            theme: "One-hit wonders".to_string(),
            description: None,
            status: "voting".to_string(),
            submission_start: None,
            submission_end: Some(now),
            voting_start: Some(now),
            voting_end: None,
            created_by: 3,
            created_at: now,
            updated_at: now,
        };

        let round = Round::try_from(model.clone()).unwrap();
        assert_eq!(round.status, RoundStatus::Voting);
        assert_eq!(round.schedule.submission_end, Some(now));

        let bad = RoundModel {
            status: "paused".to_string(),
            ..model
        };
        assert!(matches!(
            Round::try_from(bad),
            Err(DomainError::DatabaseError(_))
        ));
    }
}

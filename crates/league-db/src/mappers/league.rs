//! League and season entity <-> model mappers

use league_core::entities::{League, LeagueSettings, Season};
use league_core::error::DomainError;
use league_core::value_objects::{EmptyRoundPolicy, Snowflake};

use super::parse_column;
use crate::models::{LeagueModel, SeasonModel};

impl TryFrom<LeagueModel> for League {
    type Error = DomainError;

    fn try_from(model: LeagueModel) -> Result<Self, Self::Error> {
        let empty_round_policy =
            EmptyRoundPolicy::from_parts(&model.empty_round_policy, model.empty_round_extend_secs)
                .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(League {
            id: Snowflake::new(model.id),
            name: model.name,
            description: model.description,
            visibility: parse_column("visibility", &model.visibility)?,
            owner_id: Snowflake::new(model.owner_id),
            settings: LeagueSettings {
                scoring_mode: parse_column("scoring_mode", &model.scoring_mode)?,
                allow_multiple_submissions: model.allow_multiple_submissions,
                max_points_per_vote: model.max_points_per_vote,
                empty_round_policy,
            },
            created_at: model.created_at,
        })
    }
}

impl From<SeasonModel> for Season {
    fn from(model: SeasonModel) -> Self {
        Season {
            id: Snowflake::new(model.id),
            league_id: Snowflake::new(model.league_id),
            name: model.name,
            created_at: model.created_at,
        }
    }
}

/// League columns ready for binding
pub struct LeagueInsert<'a> {
    pub id: i64,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub visibility: &'static str,
    pub owner_id: i64,
    pub scoring_mode: &'static str,
    pub allow_multiple_submissions: bool,
    pub max_points_per_vote: i32,
    pub empty_round_policy: &'static str,
    pub empty_round_extend_secs: Option<i64>,
}

impl<'a> LeagueInsert<'a> {
    pub fn new(league: &'a League) -> Self {
        let settings = &league.settings;
        Self {
            id: league.id.into_inner(),
            name: &league.name,
            description: league.description.as_deref(),
            visibility: league.visibility.as_str(),
            owner_id: league.owner_id.into_inner(),
            scoring_mode: settings.scoring_mode.as_str(),
            allow_multiple_submissions: settings.allow_multiple_submissions,
            max_points_per_vote: settings.max_points_per_vote,
            empty_round_policy: settings.empty_round_policy.as_str(),
            empty_round_extend_secs: settings.empty_round_policy.extend_seconds(),
        }
    }
}

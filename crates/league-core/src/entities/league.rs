//! League and season entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{EmptyRoundPolicy, ScoringMode, Snowflake};

/// Points a single ballot may carry unless the league says otherwise
pub const DEFAULT_MAX_POINTS_PER_VOTE: i32 = 5;

/// Who can see a league without being a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }
}

impl FromStr for Visibility {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            other => Err(DomainError::ValidationError(format!(
                "unknown visibility: {other}"
            ))),
        }
    }
}

/// Game rules chosen when the league is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSettings {
    pub scoring_mode: ScoringMode,
    pub allow_multiple_submissions: bool,
    pub max_points_per_vote: i32,
    pub empty_round_policy: EmptyRoundPolicy,
}

impl Default for LeagueSettings {
    fn default() -> Self {
        Self {
            scoring_mode: ScoringMode::Points,
            allow_multiple_submissions: false,
            max_points_per_vote: DEFAULT_MAX_POINTS_PER_VOTE,
            empty_round_policy: EmptyRoundPolicy::Hold,
        }
    }
}

/// League entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct League {
    pub id: Snowflake,
    pub name: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    pub owner_id: Snowflake,
    pub settings: LeagueSettings,
    pub created_at: DateTime<Utc>,
}

impl League {
    pub fn new(id: Snowflake, name: String, owner_id: Snowflake, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            description: None,
            visibility: Visibility::Private,
            owner_id,
            settings: LeagueSettings::default(),
            created_at: now,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_settings(mut self, settings: LeagueSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// A named run of rounds with its own leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub id: Snowflake,
    pub league_id: Snowflake,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Season {
    pub fn new(id: Snowflake, league_id: Snowflake, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            league_id,
            name,
            created_at: now,
        }
    }
}

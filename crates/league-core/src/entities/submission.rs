//! Submission entity - a track entered into a round

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Track identity as supplied by the submitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub external_id: Option<String>,
    pub genre: Option<String>,
}

/// Submission entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: Snowflake,
    pub round_id: Snowflake,
    pub league_id: Snowflake,
    pub user_id: Snowflake,
    pub track: Track,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(
        id: Snowflake,
        round_id: Snowflake,
        league_id: Snowflake,
        user_id: Snowflake,
        track: Track,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            round_id,
            league_id,
            user_id,
            track,
            submitted_at: now,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.user_id == user_id
    }
}

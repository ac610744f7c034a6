//! Path parameter extractors
//!
//! Ids arrive as strings; each path struct parses its ids into Snowflakes so
//! a malformed id is a 400 rather than a 404.

use league_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

/// Parse a Snowflake from a path or query value
pub fn parse_snowflake(field: &str, raw: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {field} format")))
}

/// `/leagues/:league_id`
#[derive(Debug, Deserialize)]
pub struct LeaguePath {
    pub league_id: String,
}

impl LeaguePath {
    pub fn league_id(&self) -> Result<Snowflake, ApiError> {
        parse_snowflake("league_id", &self.league_id)
    }
}

/// `/leagues/:league_id/.../:user_id`
#[derive(Debug, Deserialize)]
pub struct LeagueUserPath {
    pub league_id: String,
    pub user_id: String,
}

impl LeagueUserPath {
    pub fn ids(&self) -> Result<(Snowflake, Snowflake), ApiError> {
        Ok((
            parse_snowflake("league_id", &self.league_id)?,
            parse_snowflake("user_id", &self.user_id)?,
        ))
    }
}

/// `/leagues/:league_id/head-to-head/:user_a/:user_b`
#[derive(Debug, Deserialize)]
pub struct HeadToHeadPath {
    pub league_id: String,
    pub user_a: String,
    pub user_b: String,
}

impl HeadToHeadPath {
    pub fn ids(&self) -> Result<(Snowflake, Snowflake, Snowflake), ApiError> {
        Ok((
            parse_snowflake("league_id", &self.league_id)?,
            parse_snowflake("user_a", &self.user_a)?,
            parse_snowflake("user_b", &self.user_b)?,
        ))
    }
}

/// `/rounds/:round_id`
#[derive(Debug, Deserialize)]
pub struct RoundPath {
    pub round_id: String,
}

impl RoundPath {
    pub fn round_id(&self) -> Result<Snowflake, ApiError> {
        parse_snowflake("round_id", &self.round_id)
    }
}

/// `/submissions/:submission_id`
#[derive(Debug, Deserialize)]
pub struct SubmissionPath {
    pub submission_id: String,
}

impl SubmissionPath {
    pub fn submission_id(&self) -> Result<Snowflake, ApiError> {
        parse_snowflake("submission_id", &self.submission_id)
    }
}

/// `/submissions/:submission_id/reactions/:emoji`
#[derive(Debug, Deserialize)]
pub struct ReactionPath {
    pub submission_id: String,
    pub emoji: String,
}

impl ReactionPath {
    pub fn submission_id(&self) -> Result<Snowflake, ApiError> {
        parse_snowflake("submission_id", &self.submission_id)
    }
}

/// `/comments/:comment_id`
#[derive(Debug, Deserialize)]
pub struct CommentPath {
    pub comment_id: String,
}

impl CommentPath {
    pub fn comment_id(&self) -> Result<Snowflake, ApiError> {
        parse_snowflake("comment_id", &self.comment_id)
    }
}

/// `/invites/:handle`, where the handle is an invite code or a link token
#[derive(Debug, Deserialize)]
pub struct InvitePath {
    pub handle: String,
}

//! Scoring configuration and vote values

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// How a league's votes turn into scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Voters allocate points; score is the sum
    #[default]
    Points,
    /// Voters up- or down-vote; score is ups minus downs
    Reactions,
}

impl ScoringMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Reactions => "reactions",
        }
    }
}

impl FromStr for ScoringMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "points" => Ok(Self::Points),
            "reactions" => Ok(Self::Reactions),
            other => Err(DomainError::ValidationError(format!(
                "unknown scoring mode: {other}"
            ))),
        }
    }
}

/// A single ballot on a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VoteValue {
    Points { points: i32 },
    Up,
    Down,
}

impl VoteValue {
    /// Contribution to the submission's score
    #[inline]
    pub const fn score(self) -> i64 {
        match self {
            Self::Points { points } => points as i64,
            Self::Up => 1,
            Self::Down => -1,
        }
    }

    pub const fn kind(self) -> &'static str {
        match self {
            Self::Points { .. } => "points",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub const fn points(self) -> Option<i32> {
        match self {
            Self::Points { points } => Some(points),
            _ => None,
        }
    }

    /// Rebuild from the stored `(kind, points)` pair
    pub fn from_parts(kind: &str, points: Option<i32>) -> Result<Self, DomainError> {
        match (kind, points) {
            ("points", Some(points)) => Ok(Self::Points { points }),
            ("up", _) => Ok(Self::Up),
            ("down", _) => Ok(Self::Down),
            _ => Err(DomainError::ValidationError(format!(
                "malformed vote value: {kind}"
            ))),
        }
    }

    /// Check this ballot against the league's scoring rules
    pub fn validate_for(self, mode: ScoringMode, max_points: i32) -> Result<(), DomainError> {
        match (mode, self) {
            (ScoringMode::Points, Self::Points { points }) if (1..=max_points).contains(&points) => {
                Ok(())
            }
            (ScoringMode::Points, Self::Points { .. }) => Err(DomainError::InvalidVote(format!(
                "points must be between 1 and {max_points}"
            ))),
            (ScoringMode::Points, _) => Err(DomainError::InvalidVote(
                "this league scores with points".to_string(),
            )),
            (ScoringMode::Reactions, Self::Up | Self::Down) => Ok(()),
            (ScoringMode::Reactions, Self::Points { .. }) => Err(DomainError::InvalidVote(
                "this league scores with up/down votes".to_string(),
            )),
        }
    }
}

/// What the deadline sweep does with a round whose submission window closed
/// without a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum EmptyRoundPolicy {
    /// Stay in `submitting` until someone submits or an admin acts
    #[default]
    Hold,
    /// Push the submission deadline (and every later deadline) out
    Extend { seconds: i64 },
}

impl EmptyRoundPolicy {
    /// Thirty days
    pub const MAX_EXTEND_SECONDS: i64 = 30 * 24 * 60 * 60;

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Extend { .. } => "extend",
        }
    }

    pub const fn extend_seconds(self) -> Option<i64> {
        match self {
            Self::Hold => None,
            Self::Extend { seconds } => Some(seconds),
        }
    }

    pub fn from_parts(kind: &str, seconds: Option<i64>) -> Result<Self, DomainError> {
        let policy = match (kind, seconds) {
            ("hold", _) => Self::Hold,
            ("extend", Some(seconds)) => Self::Extend { seconds },
            _ => {
                return Err(DomainError::ValidationError(format!(
                    "malformed empty round policy: {kind}"
                )))
            }
        };
        policy.validate()?;
        Ok(policy)
    }

    /// An extension must be positive and at most [`Self::MAX_EXTEND_SECONDS`]
    pub fn validate(self) -> Result<(), DomainError> {
        match self {
            Self::Extend { seconds } if !(1..=Self::MAX_EXTEND_SECONDS).contains(&seconds) => {
                Err(DomainError::ValidationError(format!(
                    "empty round extension must be between 1 and {} seconds",
                    Self::MAX_EXTEND_SECONDS
                )))
            }
            _ => Ok(()),
        }
    }
}

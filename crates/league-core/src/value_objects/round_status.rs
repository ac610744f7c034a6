//! Round lifecycle states and the transition graph
//!
//! ```text
//! draft -> submitting -> voting -> revealed -> archived
//!              ^            |
//!              +-- revert --+
//! ```
//!
//! [`can_transition`] is the single authority for which edges exist. Every
//! write path asks [`RoundStatus::allowed_actions`] what it may do.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Draft,
    Submitting,
    Voting,
    Revealed,
    Archived,
}

bitflags! {
    /// Write operations a round phase permits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RoundActions: u8 {
        /// Insert a submission
        const SUBMIT  = 1 << 0;
        /// Cast, change or retract a vote
        const VOTE    = 1 << 1;
        /// Post a comment on a submission
        const COMMENT = 1 << 2;
        /// Toggle an emoji reaction
        const REACT   = 1 << 3;
        /// Edit theme, description and deadlines
        const EDIT    = 1 << 4;
    }
}

impl RoundActions {
    /// Human-readable name of a single flag, for error messages
    pub fn label(self) -> &'static str {
        if self == Self::SUBMIT {
            "submit"
        } else if self == Self::VOTE {
            "vote"
        } else if self == Self::COMMENT {
            "comment"
        } else if self == Self::REACT {
            "react"
        } else if self == Self::EDIT {
            "edit"
        } else {
            "action"
        }
    }
}

/// Whether `from -> to` is an edge of the lifecycle graph
pub const fn can_transition(from: RoundStatus, to: RoundStatus) -> bool {
    use RoundStatus::{Archived, Draft, Revealed, Submitting, Voting};

    matches!(
        (from, to),
        (Draft, Submitting)
            | (Submitting, Voting)
            | (Voting, Revealed)
            | (Revealed, Archived)
            | (Voting, Submitting)
    )
}

impl RoundStatus {
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Submitting,
        Self::Voting,
        Self::Revealed,
        Self::Archived,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitting => "submitting",
            Self::Voting => "voting",
            Self::Revealed => "revealed",
            Self::Archived => "archived",
        }
    }

    /// Forward successor, if any
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::Submitting),
            Self::Submitting => Some(Self::Voting),
            Self::Voting => Some(Self::Revealed),
            Self::Revealed => Some(Self::Archived),
            Self::Archived => None,
        }
    }

    /// Target of the admin revert edge, if this status has one
    pub const fn revert_target(self) -> Option<Self> {
        match self {
            Self::Voting => Some(Self::Submitting),
            _ => None,
        }
    }

    pub const fn allowed_actions(self) -> RoundActions {
        match self {
            Self::Draft => RoundActions::EDIT,
            Self::Submitting => RoundActions::SUBMIT.union(RoundActions::EDIT),
            Self::Voting => RoundActions::VOTE
                .union(RoundActions::COMMENT)
                .union(RoundActions::REACT),
            Self::Revealed | Self::Archived => RoundActions::COMMENT.union(RoundActions::REACT),
        }
    }

    /// Results (scores, submitters, every vote) are public
    #[inline]
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed | Self::Archived)
    }

    /// Validate `self -> to`, returning the illegal-transition error otherwise
    pub fn ensure_transition(self, to: Self) -> Result<(), DomainError> {
        if can_transition(self, to) {
            Ok(())
        } else {
            Err(DomainError::IllegalTransition { from: self, to })
        }
    }
}

impl fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoundStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::ValidationError(format!("unknown round status: {s}")))
    }
}

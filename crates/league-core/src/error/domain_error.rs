//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{MemberRole, RoundStatus, Snowflake};

/// Coarse classification every layer maps onto its own responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    FailedPrecondition,
    Conflict,
    Validation,
    Internal,
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("League not found: {0}")]
    LeagueNotFound(Snowflake),

    #[error("Season not found: {0}")]
    SeasonNotFound(Snowflake),

    #[error("Round not found: {0}")]
    RoundNotFound(Snowflake),

    #[error("Submission not found: {0}")]
    SubmissionNotFound(Snowflake),

    #[error("Comment not found: {0}")]
    CommentNotFound(Snowflake),

    #[error("Vote not found")]
    VoteNotFound,

    #[error("Member not found in league")]
    MemberNotFound,

    #[error("Invite not found: {0}")]
    InviteNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid round schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid vote: {0}")]
    InvalidVote(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a member of this league")]
    NotAMember,

    #[error("Requires role {required} or higher")]
    InsufficientRole { required: MemberRole },

    #[error("Cannot moderate a member of equal or higher role")]
    CannotModerateMember,

    #[error("Cannot moderate yourself")]
    CannotModerateSelf,

    #[error("Owner role cannot be granted or revoked")]
    CannotChangeOwnerRole,

    #[error("Not comment author")]
    NotCommentAuthor,

    #[error("User is banned from this league")]
    UserBanned,

    // =========================================================================
    // Precondition Errors
    // =========================================================================
    #[error("Illegal round transition: {from} -> {to}")]
    IllegalTransition { from: RoundStatus, to: RoundStatus },

    #[error("Cannot {action} while round is {status}")]
    ActionNotAllowed {
        action: &'static str,
        status: RoundStatus,
    },

    #[error("Submission window has not opened")]
    SubmissionsNotOpen,

    #[error("Submission window has closed")]
    SubmissionsClosed,

    #[error("Voting window has not opened")]
    VotingNotOpen,

    #[error("Voting window has closed")]
    VotingClosed,

    #[error("Cannot vote on your own submission")]
    SelfVote,

    #[error("Already submitted to this round")]
    DuplicateSubmission,

    #[error("Round results are not revealed yet")]
    ResultsNotRevealed,

    #[error("Invite has expired")]
    InviteExpired,

    #[error("Invite has reached maximum uses")]
    InviteExhausted,

    #[error("Already a member of this league")]
    AlreadyMember,

    #[error("User is already banned")]
    AlreadyBanned,

    #[error("User is not banned")]
    NotBanned,

    #[error("Member already has role {0}")]
    RoleUnchanged(MemberRole),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Concurrent update lost: {0}")]
    ConcurrentModification(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::LeagueNotFound(_) => "UNKNOWN_LEAGUE",
            Self::SeasonNotFound(_) => "UNKNOWN_SEASON",
            Self::RoundNotFound(_) => "UNKNOWN_ROUND",
            Self::SubmissionNotFound(_) => "UNKNOWN_SUBMISSION",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",
            Self::VoteNotFound => "UNKNOWN_VOTE",
            Self::MemberNotFound => "UNKNOWN_MEMBER",
            Self::InviteNotFound(_) => "UNKNOWN_INVITE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidSchedule(_) => "INVALID_SCHEDULE",
            Self::InvalidVote(_) => "INVALID_VOTE",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            // Authorization
            Self::NotAMember => "NOT_A_MEMBER",
            Self::InsufficientRole { .. } => "INSUFFICIENT_ROLE",
            Self::CannotModerateMember => "CANNOT_MODERATE_MEMBER",
            Self::CannotModerateSelf => "CANNOT_MODERATE_SELF",
            Self::CannotChangeOwnerRole => "CANNOT_CHANGE_OWNER_ROLE",
            Self::NotCommentAuthor => "NOT_COMMENT_AUTHOR",
            Self::UserBanned => "USER_BANNED",

            // Preconditions
            Self::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            Self::ActionNotAllowed { .. } => "PHASE_CLOSED",
            Self::SubmissionsNotOpen => "SUBMISSIONS_NOT_OPEN",
            Self::SubmissionsClosed => "SUBMISSIONS_CLOSED",
            Self::VotingNotOpen => "VOTING_NOT_OPEN",
            Self::VotingClosed => "VOTING_CLOSED",
            Self::SelfVote => "SELF_VOTE",
            Self::DuplicateSubmission => "DUPLICATE_SUBMISSION",
            Self::ResultsNotRevealed => "RESULTS_NOT_REVEALED",
            Self::InviteExpired => "INVITE_EXPIRED",
            Self::InviteExhausted => "INVITE_EXHAUSTED",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::AlreadyBanned => "ALREADY_BANNED",
            Self::NotBanned => "NOT_BANNED",
            Self::RoleUnchanged(_) => "ROLE_UNCHANGED",

            // Conflict
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::DuplicateEntry(_) => "DUPLICATE_ENTRY",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LeagueNotFound(_)
            | Self::SeasonNotFound(_)
            | Self::RoundNotFound(_)
            | Self::SubmissionNotFound(_)
            | Self::CommentNotFound(_)
            | Self::VoteNotFound
            | Self::MemberNotFound
            | Self::InviteNotFound(_) => ErrorKind::NotFound,

            Self::ValidationError(_)
            | Self::InvalidSchedule(_)
            | Self::InvalidVote(_)
            | Self::ContentTooLong { .. } => ErrorKind::Validation,

            Self::NotAMember
            | Self::InsufficientRole { .. }
            | Self::CannotModerateMember
            | Self::CannotModerateSelf
            | Self::CannotChangeOwnerRole
            | Self::NotCommentAuthor
            | Self::UserBanned => ErrorKind::Forbidden,

            Self::IllegalTransition { .. }
            | Self::ActionNotAllowed { .. }
            | Self::SubmissionsNotOpen
            | Self::SubmissionsClosed
            | Self::VotingNotOpen
            | Self::VotingClosed
            | Self::SelfVote
            | Self::DuplicateSubmission
            | Self::ResultsNotRevealed
            | Self::InviteExpired
            | Self::InviteExhausted
            | Self::AlreadyMember
            | Self::AlreadyBanned
            | Self::NotBanned
            | Self::RoleUnchanged(_) => ErrorKind::FailedPrecondition,

            Self::ConcurrentModification(_) | Self::DuplicateEntry(_) => ErrorKind::Conflict,

            Self::DatabaseError(_) | Self::CacheError(_) | Self::InternalError(_) => {
                ErrorKind::Internal
            }
        }
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    #[inline]
    pub fn is_forbidden(&self) -> bool {
        self.kind() == ErrorKind::Forbidden
    }

    #[inline]
    pub fn is_failed_precondition(&self) -> bool {
        self.kind() == ErrorKind::FailedPrecondition
    }

    #[inline]
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::LeagueNotFound(Snowflake::new(1));
        assert_eq!(err.code(), "UNKNOWN_LEAGUE");

        let err = DomainError::InsufficientRole {
            required: MemberRole::Admin,
        };
        assert_eq!(err.code(), "INSUFFICIENT_ROLE");
    }

    #[test]
    fn test_kinds() {
        assert!(DomainError::RoundNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::UserBanned.is_forbidden());
        assert!(DomainError::SelfVote.is_failed_precondition());
        assert!(DomainError::InviteExhausted.is_failed_precondition());
        assert!(DomainError::AlreadyMember.is_failed_precondition());
        assert!(DomainError::ConcurrentModification("round".into()).is_conflict());
        assert_eq!(
            DomainError::DatabaseError("down".into()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::IllegalTransition {
            from: RoundStatus::Draft,
            to: RoundStatus::Voting,
        };
        assert_eq!(err.to_string(), "Illegal round transition: draft -> voting");

        let err = DomainError::ActionNotAllowed {
            action: "vote",
            status: RoundStatus::Submitting,
        };
        assert_eq!(err.to_string(), "Cannot vote while round is submitting");
    }
}

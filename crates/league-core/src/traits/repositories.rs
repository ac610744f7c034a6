//! Repository traits (ports) - define the interface for data access
//!
//! Operations documented as atomic must run as one unit in the store:
//! either every effect lands or none does, and concurrent callers touching
//! the same row are serialized. Capacity, phase and uniqueness checks happen
//! inside that unit, never against an earlier read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Comment, Invite, League, LeagueMember, ModerationEffect, ModerationLogEntry, Reaction, Round,
    Season, Submission, Vote,
};
use crate::error::DomainError;
use crate::value_objects::{RoundStatus, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// League Repository
// ============================================================================

#[async_trait]
pub trait LeagueRepository: Send + Sync {
    /// Find league by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<League>>;

    /// Leagues in which the user holds an active membership
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<League>>;

    /// Insert the league and its owner row atomically
    async fn create_with_owner(&self, league: &League, owner: &LeagueMember) -> RepoResult<()>;

    /// Number of active members
    async fn member_count(&self, league_id: Snowflake) -> RepoResult<i64>;
}

// ============================================================================
// Season Repository
// ============================================================================

#[async_trait]
pub trait SeasonRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Season>>;

    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Season>>;

    async fn create(&self, season: &Season) -> RepoResult<()>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// The user's active (not kicked, not banned) membership row
    async fn find_active(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<LeagueMember>>;

    /// All active members of a league, by join time
    async fn find_active_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<LeagueMember>>;

    /// The row carrying an outstanding ban, if any
    async fn find_active_ban(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<LeagueMember>>;

    /// Outstanding bans in a league
    async fn find_bans(&self, league_id: Snowflake) -> RepoResult<Vec<LeagueMember>>;

    /// Every row ever recorded for the user in the league, oldest first
    async fn find_history(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<LeagueMember>>;
}

// ============================================================================
// Invite Repository
// ============================================================================

#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Find invite by code or link token
    async fn find_by_handle(&self, handle: &str) -> RepoResult<Option<Invite>>;

    /// List invites of a league, newest first
    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Invite>>;

    async fn create(&self, invite: &Invite) -> RepoResult<()>;

    /// Delete an invite by code
    async fn delete(&self, code: &str) -> RepoResult<()>;

    /// Atomically redeem an invite for `member.user_id`.
    ///
    /// Inside one unit: the invite row is locked, then expiry, capacity,
    /// outstanding bans and existing active membership are checked; on
    /// success `member` is inserted and `uses` incremented. On any failure
    /// nothing is written. Returns the invite as updated.
    async fn redeem(
        &self,
        handle: &str,
        member: &LeagueMember,
        now: DateTime<Utc>,
    ) -> RepoResult<Invite>;
}

// ============================================================================
// Round Repository
// ============================================================================

#[async_trait]
pub trait RoundRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Round>>;

    /// Rounds of a league, newest first
    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Round>>;

    /// Revealed or archived rounds, optionally limited to one season
    async fn find_revealed(
        &self,
        league_id: Snowflake,
        season_id: Option<Snowflake>,
    ) -> RepoResult<Vec<Round>>;

    /// Rounds in `submitting` or `voting` whose phase deadline is at or before `now`
    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<Round>>;

    async fn create(&self, round: &Round) -> RepoResult<()>;

    /// Overwrite theme, description, season and schedule, but only while the
    /// stored status still equals `expected`.
    async fn update_details(&self, round: &Round, expected: RoundStatus) -> RepoResult<()>;

    /// Compare-and-swap the status from `from` to `to`.
    ///
    /// Fails with a conflict if the stored status is no longer `from`. The
    /// revert edge (`voting -> submitting`) deletes the round's votes and
    /// clears a submission deadline that has already passed, in the same
    /// unit.
    async fn transition(
        &self,
        id: Snowflake,
        from: RoundStatus,
        to: RoundStatus,
        now: DateTime<Utc>,
    ) -> RepoResult<Round>;
}

// ============================================================================
// Submission Repository
// ============================================================================

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Submission>>;

    /// Submissions of a round, oldest first
    async fn find_by_round(&self, round_id: Snowflake) -> RepoResult<Vec<Submission>>;

    async fn find_by_rounds(&self, round_ids: &[Snowflake]) -> RepoResult<Vec<Submission>>;

    async fn count_by_round(&self, round_id: Snowflake) -> RepoResult<i64>;

    /// Atomically insert a submission. The round row is locked and must be
    /// `submitting`; unless `allow_multiple`, the member must not already
    /// have a submission in the round.
    async fn create(&self, submission: &Submission, allow_multiple: bool) -> RepoResult<()>;
}

// ============================================================================
// Vote Repository
// ============================================================================

#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn find_by_round(&self, round_id: Snowflake) -> RepoResult<Vec<Vote>>;

    async fn find_by_rounds(&self, round_ids: &[Snowflake]) -> RepoResult<Vec<Vote>>;

    async fn find_by_voter(&self, round_id: Snowflake, voter_id: Snowflake)
        -> RepoResult<Vec<Vote>>;

    /// Insert or replace the voter's ballot on a submission while the round
    /// is `voting`. One row per (submission, voter); an existing row keeps
    /// its id and creation time. Returns the stored vote.
    async fn upsert(&self, vote: &Vote) -> RepoResult<Vote>;

    /// Remove the voter's ballot while the round is `voting`
    async fn delete(
        &self,
        round_id: Snowflake,
        submission_id: Snowflake,
        voter_id: Snowflake,
    ) -> RepoResult<()>;
}

// ============================================================================
// Reaction & Comment Repositories
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Add the reaction if absent, remove it if present.
    /// Returns whether the reaction exists afterwards.
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<bool>;

    async fn find_by_submission(&self, submission_id: Snowflake) -> RepoResult<Vec<Reaction>>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>>;

    /// Comments on a submission, oldest first
    async fn find_by_submission(&self, submission_id: Snowflake) -> RepoResult<Vec<Comment>>;

    async fn create(&self, comment: &Comment) -> RepoResult<()>;

    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Moderation Repository
// ============================================================================

#[async_trait]
pub trait ModerationRepository: Send + Sync {
    /// Apply a membership effect and append its audit entry as one unit.
    /// Neither lands without the other.
    async fn apply(&self, effect: &ModerationEffect, entry: &ModerationLogEntry)
        -> RepoResult<()>;

    /// Audit log of a league, newest first
    async fn find_log(
        &self,
        league_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationLogEntry>>;
}

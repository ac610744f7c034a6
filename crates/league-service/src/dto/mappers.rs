//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use league_core::entities::{
    Comment, Invite, League, LeagueMember, ModerationLogEntry, ReactionCount, Round, Season,
    Submission, Vote,
};
use league_core::tally::RankedSubmission;

use super::responses::{
    BanResponse, CommentResponse, InviteResponse, LeagueResponse, MemberResponse,
    ModerationLogResponse, ReactionCountResponse, RoundResponse, SeasonResponse, StandingResponse,
    SubmissionResponse, VoteResponse,
};

// ============================================================================
// League Mappers
// ============================================================================

impl From<&League> for LeagueResponse {
    fn from(league: &League) -> Self {
        Self {
            id: league.id,
            name: league.name.clone(),
            description: league.description.clone(),
            visibility: league.visibility,
            owner_id: league.owner_id,
            settings: league.settings,
            member_count: None,
            my_role: None,
            created_at: league.created_at,
        }
    }
}

impl From<League> for LeagueResponse {
    fn from(league: League) -> Self {
        Self::from(&league)
    }
}

impl From<&LeagueMember> for MemberResponse {
    fn from(member: &LeagueMember) -> Self {
        Self {
            league_id: member.league_id,
            user_id: member.user_id,
            role: member.role,
            joined_at: member.joined_at,
        }
    }
}

impl From<&LeagueMember> for BanResponse {
    fn from(member: &LeagueMember) -> Self {
        Self {
            user_id: member.user_id,
            reason: member.ban_reason.clone(),
            banned_at: member.banned_at,
        }
    }
}

impl From<&Season> for SeasonResponse {
    fn from(season: &Season) -> Self {
        Self {
            id: season.id,
            league_id: season.league_id,
            name: season.name.clone(),
            created_at: season.created_at,
        }
    }
}

// ============================================================================
// Invite Mappers
// ============================================================================

impl From<&Invite> for InviteResponse {
    fn from(invite: &Invite) -> Self {
        Self {
            code: invite.code.clone(),
            link_token: invite.link_token.clone(),
            league_id: invite.league_id,
            created_by: invite.created_by,
            uses: invite.uses,
            max_uses: invite.max_uses,
            expires_at: invite.expires_at,
            created_at: invite.created_at,
        }
    }
}

// ============================================================================
// Round Mappers
// ============================================================================

impl From<&Round> for RoundResponse {
    fn from(round: &Round) -> Self {
        let allowed = round.status.allowed_actions();
        Self {
            id: round.id,
            league_id: round.league_id,
            season_id: round.season_id,
            theme: round.theme.clone(),
            description: round.description.clone(),
            status: round.status,
            schedule: round.schedule,
            allowed_actions: allowed.iter().map(|flag| flag.label()).collect(),
            created_by: round.created_by,
            created_at: round.created_at,
            updated_at: round.updated_at,
        }
    }
}

impl From<Round> for RoundResponse {
    fn from(round: Round) -> Self {
        Self::from(&round)
    }
}

impl From<&ReactionCount> for ReactionCountResponse {
    fn from(count: &ReactionCount) -> Self {
        Self {
            emoji: count.emoji.clone(),
            count: count.count,
            me: count.me,
        }
    }
}

/// Submission as seen by one viewer
pub struct SubmissionView<'a> {
    pub submission: &'a Submission,
    pub reveal_submitter: bool,
    pub is_mine: bool,
    pub reactions: &'a [ReactionCount],
}

impl From<SubmissionView<'_>> for SubmissionResponse {
    fn from(view: SubmissionView<'_>) -> Self {
        let submission = view.submission;
        Self {
            id: submission.id,
            round_id: submission.round_id,
            user_id: (view.reveal_submitter || view.is_mine).then_some(submission.user_id),
            track: submission.track.clone(),
            submitted_at: submission.submitted_at,
            is_mine: view.is_mine,
            reactions: view.reactions.iter().map(ReactionCountResponse::from).collect(),
        }
    }
}

impl From<&Vote> for VoteResponse {
    fn from(vote: &Vote) -> Self {
        Self {
            id: vote.id,
            round_id: vote.round_id,
            submission_id: vote.submission_id,
            voter_id: vote.voter_id,
            value: vote.value,
            created_at: vote.created_at,
            updated_at: vote.updated_at,
        }
    }
}

impl From<&Comment> for CommentResponse {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            round_id: comment.round_id,
            submission_id: comment.submission_id,
            author_id: comment.author_id,
            content: comment.content.clone(),
            created_at: comment.created_at,
        }
    }
}

// ============================================================================
// Result Mappers
// ============================================================================

/// Tally entry joined with its track
pub struct RankedWithTrack<'a> {
    pub ranked: &'a RankedSubmission,
    pub submission: &'a Submission,
}

impl From<RankedWithTrack<'_>> for StandingResponse {
    fn from(item: RankedWithTrack<'_>) -> Self {
        let entry = &item.ranked.entry;
        Self {
            placement: item.ranked.placement,
            submission_id: entry.submission_id,
            user_id: entry.user_id,
            title: item.submission.track.title.clone(),
            artist: item.submission.track.artist.clone(),
            score: entry.score,
            upvotes: entry.upvotes,
            downvotes: entry.downvotes,
            vote_count: entry.vote_count,
        }
    }
}

impl From<&ModerationLogEntry> for ModerationLogResponse {
    fn from(entry: &ModerationLogEntry) -> Self {
        Self {
            id: entry.id,
            performer_id: entry.performer_id,
            target_id: entry.target_id,
            action: entry.action,
            reason: entry.reason.clone(),
            metadata: entry.metadata.clone(),
            created_at: entry.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use league_core::entities::Track;
    use league_core::{RoundStatus, Snowflake};

    fn submission() -> Submission {
        Submission::new(
            Snowflake::new(10),
            Snowflake::new(2),
            Snowflake::new(1),
            Snowflake::new(7),
            Track {
                title: "Teardrop".into(),
                artist: "Massive Attack".into(),
                album: None,
                external_id: None,
                genre: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_submitter_hidden_from_others() {
        let submission = submission();
        let hidden = SubmissionResponse::from(SubmissionView {
            submission: &submission,
            reveal_submitter: false,
            is_mine: false,
            reactions: &[],
        });
        assert!(hidden.user_id.is_none());

        let own = SubmissionResponse::from(SubmissionView {
            submission: &submission,
            reveal_submitter: false,
            is_mine: true,
            reactions: &[],
        });
        assert_eq!(own.user_id, Some(Snowflake::new(7)));
    }

    #[test]
    fn test_round_lists_allowed_actions() {
        let mut round = Round::new(
            Snowflake::new(2),
            Snowflake::new(1),
            "Covers".into(),
            Snowflake::new(7),
            Utc::now(),
        );
        round.status = RoundStatus::Voting;
        let response = RoundResponse::from(&round);
        assert_eq!(response.allowed_actions, vec!["vote", "comment", "react"]);
    }
}

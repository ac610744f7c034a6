//! Vote, reaction and comment entity <-> model mappers

use league_core::entities::{Comment, Reaction, Vote};
use league_core::error::DomainError;
use league_core::value_objects::{Snowflake, VoteValue};

use crate::models::{CommentModel, ReactionModel, VoteModel};

impl TryFrom<VoteModel> for Vote {
    type Error = DomainError;

    fn try_from(model: VoteModel) -> Result<Self, Self::Error> {
        let value = VoteValue::from_parts(&model.kind, model.points)
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(Vote {
            id: Snowflake::new(model.id),
            round_id: Snowflake::new(model.round_id),
            submission_id: Snowflake::new(model.submission_id),
            voter_id: Snowflake::new(model.voter_id),
            value,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Vote columns ready for binding; the value is split into kind and points
pub struct VoteInsert {
    pub id: i64,
    pub round_id: i64,
    pub submission_id: i64,
    pub voter_id: i64,
    pub kind: &'static str,
    pub points: Option<i32>,
}

impl VoteInsert {
    pub fn new(vote: &Vote) -> Self {
        Self {
            id: vote.id.into_inner(),
            round_id: vote.round_id.into_inner(),
            submission_id: vote.submission_id.into_inner(),
            voter_id: vote.voter_id.into_inner(),
            kind: vote.value.kind(),
            points: vote.value.points(),
        }
    }
}

impl From<ReactionModel> for Reaction {
    fn from(model: ReactionModel) -> Self {
        Reaction {
            submission_id: Snowflake::new(model.submission_id),
            user_id: Snowflake::new(model.user_id),
            emoji: model.emoji,
            created_at: model.created_at,
        }
    }
}

impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        Comment {
            id: Snowflake::new(model.id),
            round_id: Snowflake::new(model.round_id),
            submission_id: Snowflake::new(model.submission_id),
            author_id: Snowflake::new(model.author_id),
            content: model.content,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_vote_value_columns() {
        let vote = Vote::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(3),
            Snowflake::new(4),
            VoteValue::Points { points: 4 },
            Utc::now(),
        );
        let insert = VoteInsert::new(&vote);
        assert_eq!(insert.kind, "points");
        assert_eq!(insert.points, Some(4));

        let row = VoteModel {
            id: 1,
            round_id: 2,
            submission_id: 3,
            voter_id: 4,
            kind: "down".to_string(),
            points: None,
            created_at: vote.created_at,
            updated_at: vote.updated_at,
        };
        assert_eq!(Vote::try_from(row).unwrap().value, VoteValue::Down);
    }

    #[test]
    fn test_points_row_without_points_is_corrupt() {
        let row = VoteModel {
            id: 1,
            round_id: 2,
            submission_id: 3,
            voter_id: 4,
            kind: "points".to_string(),
            points: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            Vote::try_from(row),
            Err(DomainError::DatabaseError(_))
        ));
    }
}

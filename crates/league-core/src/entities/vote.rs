//! Votes, emoji reactions and comments on submissions

use chrono::{DateTime, Utc};

use crate::value_objects::{Snowflake, VoteValue};

/// Maximum comment length in characters
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// One member's ballot on one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: Snowflake,
    pub round_id: Snowflake,
    pub submission_id: Snowflake,
    pub voter_id: Snowflake,
    pub value: VoteValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(
        id: Snowflake,
        round_id: Snowflake,
        submission_id: Snowflake,
        voter_id: Snowflake,
        value: VoteValue,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            round_id,
            submission_id,
            voter_id,
            value,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Emoji reaction, unique per (submission, user, emoji)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub submission_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregated reaction count for one emoji
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: i64,
    pub me: bool,
}

impl ReactionCount {
    /// Group reactions by emoji, first-seen order
    pub fn summarize(reactions: &[Reaction], viewer: Snowflake) -> Vec<Self> {
        let mut counts: Vec<Self> = Vec::new();
        for reaction in reactions {
            let mine = reaction.user_id == viewer;
            if let Some(entry) = counts.iter_mut().find(|c| c.emoji == reaction.emoji) {
                entry.count += 1;
                entry.me |= mine;
            } else {
                counts.push(Self {
                    emoji: reaction.emoji.clone(),
                    count: 1,
                    me: mine,
                });
            }
        }
        counts
    }
}

/// Comment on a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Snowflake,
    pub round_id: Snowflake,
    pub submission_id: Snowflake,
    pub author_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

//! In-process storage backend
//!
//! [`MemoryStore`] keeps every table in one [`State`] behind a single mutex.
//! Each repository call takes the lock once and never awaits while holding
//! it, so every operation is atomic and concurrent callers are serialized,
//! matching what the PostgreSQL repositories guarantee with transactions.

mod repositories;


use std::collections::{BTreeMap, HashMap};

use league_core::entities::{
    Comment, Invite, League, LeagueMember, ModerationLogEntry, Reaction, Round, Season,
    Submission, Vote,
};
use league_core::value_objects::Snowflake;
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct State {
    leagues: HashMap<Snowflake, League>,
    seasons: BTreeMap<Snowflake, Season>,
    members: Vec<LeagueMember>,
    /// Keyed by invite code
    invites: HashMap<String, Invite>,
    rounds: HashMap<Snowflake, Round>,
    submissions: BTreeMap<Snowflake, Submission>,
    /// Keyed by (submission, voter): one ballot each
    votes: HashMap<(Snowflake, Snowflake), Vote>,
    reactions: Vec<Reaction>,
    comments: BTreeMap<Snowflake, Comment>,
    moderation_log: Vec<ModerationLogEntry>,
}

impl State {
    fn active_member(&self, league_id: Snowflake, user_id: Snowflake) -> Option<&LeagueMember> {
        self.members
            .iter()
            .find(|m| m.league_id == league_id && m.user_id == user_id && m.is_active())
    }

    fn active_member_mut(
        &mut self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> Option<&mut LeagueMember> {
        self.members
            .iter_mut()
            .find(|m| m.league_id == league_id && m.user_id == user_id && m.is_active())
    }

    fn outstanding_ban_mut(
        &mut self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> Option<&mut LeagueMember> {
        self.members
            .iter_mut()
            .find(|m| m.league_id == league_id && m.user_id == user_id && m.is_banned())
    }

    fn is_banned(&self, league_id: Snowflake, user_id: Snowflake) -> bool {
        self.members
            .iter()
            .any(|m| m.league_id == league_id && m.user_id == user_id && m.is_banned())
    }
}

/// Every repository trait over one shared in-memory state
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

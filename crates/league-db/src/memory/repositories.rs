//! Repository trait implementations for [`MemoryStore`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, instrument};

use league_core::entities::{
    Comment, Invite, League, LeagueMember, ModerationEffect, ModerationLogEntry, Reaction, Round,
    Season, Submission, Vote,
};
use league_core::error::DomainError;
use league_core::lifecycle::is_held;
use league_core::traits::{
    CommentRepository, InviteRepository, LeagueRepository, MemberRepository,
    ModerationRepository, ReactionRepository, RepoResult, RoundRepository, SeasonRepository,
    SubmissionRepository, VoteRepository,
};
use league_core::value_objects::{MemberRole, RoundActions, RoundStatus, Snowflake};

use super::{MemoryStore, State};

fn stale_round(id: Snowflake, actual: RoundStatus, expected: RoundStatus) -> DomainError {
    DomainError::ConcurrentModification(format!("round {id} is {actual}, expected {expected}"))
}

fn stale_role(expected: Option<MemberRole>, actual: Option<MemberRole>) -> DomainError {
    let show = |role: Option<MemberRole>| role.map_or("none", MemberRole::as_str);
    DomainError::ConcurrentModification(format!(
        "member role changed from {} to {}",
        show(expected),
        show(actual)
    ))
}

/// Require the round to exist and be in `status`, else refuse `action`
fn require_status(
    state: &State,
    round_id: Snowflake,
    status: RoundStatus,
    action: RoundActions,
) -> Result<(), DomainError> {
    let round = state
        .rounds
        .get(&round_id)
        .ok_or(DomainError::RoundNotFound(round_id))?;
    if round.status != status {
        return Err(DomainError::ActionNotAllowed {
            action: action.label(),
            status: round.status,
        });
    }
    Ok(())
}

// ============================================================================
// Leagues & seasons
// ============================================================================

#[async_trait]
impl LeagueRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<League>> {
        Ok(self.state.lock().leagues.get(&id).cloned())
    }

    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<League>> {
        let state = self.state.lock();
        let mut memberships: Vec<&LeagueMember> = state
            .members
            .iter()
            .filter(|m| m.user_id == user_id && m.is_active())
            .collect();
        memberships.sort_by_key(|m| (m.joined_at, m.id));

        Ok(memberships
            .into_iter()
            .filter_map(|m| state.leagues.get(&m.league_id).cloned())
            .collect())
    }

    async fn create_with_owner(&self, league: &League, owner: &LeagueMember) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.leagues.contains_key(&league.id) {
            return Err(DomainError::DuplicateEntry("league".into()));
        }
        state.leagues.insert(league.id, league.clone());
        state.members.push(owner.clone());
        Ok(())
    }

    async fn member_count(&self, league_id: Snowflake) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(state
            .members
            .iter()
            .filter(|m| m.league_id == league_id && m.is_active())
            .count() as i64)
    }
}

#[async_trait]
impl SeasonRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Season>> {
        Ok(self.state.lock().seasons.get(&id).cloned())
    }

    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Season>> {
        let state = self.state.lock();
        let mut seasons: Vec<Season> = state
            .seasons
            .values()
            .filter(|s| s.league_id == league_id)
            .cloned()
            .collect();
        seasons.sort_by_key(|s| (s.created_at, s.id));
        Ok(seasons)
    }

    async fn create(&self, season: &Season) -> RepoResult<()> {
        let mut state = self.state.lock();
        if !state.leagues.contains_key(&season.league_id) {
            return Err(DomainError::LeagueNotFound(season.league_id));
        }
        if state.seasons.contains_key(&season.id) {
            return Err(DomainError::DuplicateEntry("season".into()));
        }
        state.seasons.insert(season.id, season.clone());
        Ok(())
    }
}

// ============================================================================
// Membership
// ============================================================================

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn find_active(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<LeagueMember>> {
        Ok(self.state.lock().active_member(league_id, user_id).cloned())
    }

    async fn find_active_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<LeagueMember>> {
        let state = self.state.lock();
        let mut members: Vec<LeagueMember> = state
            .members
            .iter()
            .filter(|m| m.league_id == league_id && m.is_active())
            .cloned()
            .collect();
        members.sort_by_key(|m| (m.joined_at, m.id));
        Ok(members)
    }

    async fn find_active_ban(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<LeagueMember>> {
        let state = self.state.lock();
        Ok(state
            .members
            .iter()
            .find(|m| m.league_id == league_id && m.user_id == user_id && m.is_banned())
            .cloned())
    }

    async fn find_bans(&self, league_id: Snowflake) -> RepoResult<Vec<LeagueMember>> {
        let state = self.state.lock();
        let mut bans: Vec<LeagueMember> = state
            .members
            .iter()
            .filter(|m| m.league_id == league_id && m.is_banned())
            .cloned()
            .collect();
        bans.sort_by(|a, b| b.banned_at.cmp(&a.banned_at));
        Ok(bans)
    }

    async fn find_history(
        &self,
        league_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Vec<LeagueMember>> {
        let state = self.state.lock();
        let mut rows: Vec<LeagueMember> = state
            .members
            .iter()
            .filter(|m| m.league_id == league_id && m.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| (m.joined_at, m.id));
        Ok(rows)
    }
}

// ============================================================================
// Invites
// ============================================================================

#[async_trait]
impl InviteRepository for MemoryStore {
    async fn find_by_handle(&self, handle: &str) -> RepoResult<Option<Invite>> {
        let state = self.state.lock();
        Ok(state.invites.values().find(|i| i.matches(handle)).cloned())
    }

    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Invite>> {
        let state = self.state.lock();
        let mut invites: Vec<Invite> = state
            .invites
            .values()
            .filter(|i| i.league_id == league_id)
            .cloned()
            .collect();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }

    async fn create(&self, invite: &Invite) -> RepoResult<()> {
        let mut state = self.state.lock();
        let taken = state
            .invites
            .values()
            .any(|i| i.code == invite.code || i.link_token == invite.link_token);
        if taken {
            return Err(DomainError::DuplicateEntry("invite code".into()));
        }
        state.invites.insert(invite.code.clone(), invite.clone());
        Ok(())
    }

    async fn delete(&self, code: &str) -> RepoResult<()> {
        self.state
            .lock()
            .invites
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| DomainError::InviteNotFound(code.to_string()))
    }

    #[instrument(skip(self, handle, member), fields(user_id = %member.user_id))]
    async fn redeem(
        &self,
        handle: &str,
        member: &LeagueMember,
        now: DateTime<Utc>,
    ) -> RepoResult<Invite> {
        let mut state = self.state.lock();

        let invite = state
            .invites
            .values()
            .find(|i| i.matches(handle))
            .cloned()
            .ok_or_else(|| DomainError::InviteNotFound(handle.to_string()))?;

        if invite.is_expired(now) {
            return Err(DomainError::InviteExpired);
        }
        if invite.is_exhausted() {
            return Err(DomainError::InviteExhausted);
        }
        if state.is_banned(invite.league_id, member.user_id) {
            return Err(DomainError::UserBanned);
        }
        if state.active_member(invite.league_id, member.user_id).is_some() {
            return Err(DomainError::AlreadyMember);
        }

        let mut joined = member.clone();
        joined.league_id = invite.league_id;
        state.members.push(joined);

        let stored = state
            .invites
            .get_mut(&invite.code)
            .ok_or_else(|| DomainError::InviteNotFound(handle.to_string()))?;
        stored.uses += 1;

        debug!(code = %stored.code, uses = stored.uses, "Invite redeemed");
        Ok(stored.clone())
    }
}

// ============================================================================
// Rounds
// ============================================================================

#[async_trait]
impl RoundRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Round>> {
        Ok(self.state.lock().rounds.get(&id).cloned())
    }

    async fn find_by_league(&self, league_id: Snowflake) -> RepoResult<Vec<Round>> {
        let state = self.state.lock();
        let mut rounds: Vec<Round> = state
            .rounds
            .values()
            .filter(|r| r.league_id == league_id)
            .cloned()
            .collect();
        rounds.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rounds)
    }

    async fn find_revealed(
        &self,
        league_id: Snowflake,
        season_id: Option<Snowflake>,
    ) -> RepoResult<Vec<Round>> {
        let state = self.state.lock();
        let mut rounds: Vec<Round> = state
            .rounds
            .values()
            .filter(|r| r.league_id == league_id && r.status.is_revealed())
            .filter(|r| season_id.is_none() || r.season_id == season_id)
            .cloned()
            .collect();
        rounds.sort_by_key(|r| (r.created_at, r.id));
        Ok(rounds)
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: i64) -> RepoResult<Vec<Round>> {
        let state = self.state.lock();
        let entered: HashSet<Snowflake> = state.submissions.values().map(|s| s.round_id).collect();
        let mut due: Vec<Round> = state
            .rounds
            .values()
            .filter(|r| r.due_transition(now).is_some())
            .filter(|r| {
                let policy = state
                    .leagues
                    .get(&r.league_id)
                    .map(|league| league.settings.empty_round_policy)
                    .unwrap_or_default();
                let count = usize::from(entered.contains(&r.id));
                !is_held(r, count, policy, now)
            })
            .cloned()
            .collect();
        due.sort_by_key(|r| {
            let deadline = match r.status {
                RoundStatus::Submitting => r.schedule.submission_end,
                _ => r.schedule.voting_end,
            };
            (deadline, r.id)
        });
        due.truncate(usize::try_from(limit.clamp(1, 1000)).unwrap_or(1000));
        Ok(due)
    }

    async fn create(&self, round: &Round) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.rounds.contains_key(&round.id) {
            return Err(DomainError::DuplicateEntry("round".into()));
        }
        state.rounds.insert(round.id, round.clone());
        Ok(())
    }

    async fn update_details(&self, round: &Round, expected: RoundStatus) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .rounds
            .get_mut(&round.id)
            .ok_or(DomainError::RoundNotFound(round.id))?;
        if stored.status != expected {
            return Err(stale_round(round.id, stored.status, expected));
        }

        stored.theme.clone_from(&round.theme);
        stored.description.clone_from(&round.description);
        stored.season_id = round.season_id;
        stored.schedule = round.schedule;
        stored.updated_at = round.updated_at;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        id: Snowflake,
        from: RoundStatus,
        to: RoundStatus,
        now: DateTime<Utc>,
    ) -> RepoResult<Round> {
        from.ensure_transition(to)?;
        let mut state = self.state.lock();

        let stored = state
            .rounds
            .get_mut(&id)
            .ok_or(DomainError::RoundNotFound(id))?;
        if stored.status != from {
            return Err(stale_round(id, stored.status, from));
        }
        let revert = from == RoundStatus::Voting && to == RoundStatus::Submitting;
        stored.status = to;
        stored.updated_at = now;
        if revert && stored.schedule.submission_end.is_some_and(|end| end <= now) {
            stored.schedule.submission_end = None;
        }
        let updated = stored.clone();

        if revert {
            let before = state.votes.len();
            state.votes.retain(|_, v| v.round_id != id);
            debug!(round_id = %id, discarded = before - state.votes.len(), "Votes discarded by revert");
        }

        Ok(updated)
    }
}

// ============================================================================
// Submissions & votes
// ============================================================================

#[async_trait]
impl SubmissionRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Submission>> {
        Ok(self.state.lock().submissions.get(&id).cloned())
    }

    async fn find_by_round(&self, round_id: Snowflake) -> RepoResult<Vec<Submission>> {
        SubmissionRepository::find_by_rounds(self, &[round_id]).await
    }

    async fn find_by_rounds(&self, round_ids: &[Snowflake]) -> RepoResult<Vec<Submission>> {
        let state = self.state.lock();
        let mut submissions: Vec<Submission> = state
            .submissions
            .values()
            .filter(|s| round_ids.contains(&s.round_id))
            .cloned()
            .collect();
        submissions.sort_by_key(|s| (s.submitted_at, s.id));
        Ok(submissions)
    }

    async fn count_by_round(&self, round_id: Snowflake) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(state
            .submissions
            .values()
            .filter(|s| s.round_id == round_id)
            .count() as i64)
    }

    async fn create(&self, submission: &Submission, allow_multiple: bool) -> RepoResult<()> {
        let mut state = self.state.lock();
        require_status(
            &state,
            submission.round_id,
            RoundStatus::Submitting,
            RoundActions::SUBMIT,
        )?;

        if !allow_multiple
            && state
                .submissions
                .values()
                .any(|s| s.round_id == submission.round_id && s.user_id == submission.user_id)
        {
            return Err(DomainError::DuplicateSubmission);
        }
        if state.submissions.contains_key(&submission.id) {
            return Err(DomainError::DuplicateEntry("submission".into()));
        }

        state.submissions.insert(submission.id, submission.clone());
        Ok(())
    }
}

#[async_trait]
impl VoteRepository for MemoryStore {
    async fn find_by_round(&self, round_id: Snowflake) -> RepoResult<Vec<Vote>> {
        VoteRepository::find_by_rounds(self, &[round_id]).await
    }

    async fn find_by_rounds(&self, round_ids: &[Snowflake]) -> RepoResult<Vec<Vote>> {
        let state = self.state.lock();
        let mut votes: Vec<Vote> = state
            .votes
            .values()
            .filter(|v| round_ids.contains(&v.round_id))
            .cloned()
            .collect();
        votes.sort_by_key(|v| (v.created_at, v.id));
        Ok(votes)
    }

    async fn find_by_voter(
        &self,
        round_id: Snowflake,
        voter_id: Snowflake,
    ) -> RepoResult<Vec<Vote>> {
        let state = self.state.lock();
        let mut votes: Vec<Vote> = state
            .votes
            .values()
            .filter(|v| v.round_id == round_id && v.voter_id == voter_id)
            .cloned()
            .collect();
        votes.sort_by_key(|v| (v.created_at, v.id));
        Ok(votes)
    }

    async fn upsert(&self, vote: &Vote) -> RepoResult<Vote> {
        let mut state = self.state.lock();
        require_status(&state, vote.round_id, RoundStatus::Voting, RoundActions::VOTE)?;

        let stored = state
            .votes
            .entry((vote.submission_id, vote.voter_id))
            .and_modify(|existing| {
                existing.value = vote.value;
                existing.updated_at = vote.updated_at;
            })
            .or_insert_with(|| vote.clone());
        Ok(stored.clone())
    }

    async fn delete(
        &self,
        round_id: Snowflake,
        submission_id: Snowflake,
        voter_id: Snowflake,
    ) -> RepoResult<()> {
        let mut state = self.state.lock();
        require_status(&state, round_id, RoundStatus::Voting, RoundActions::VOTE)?;

        match state.votes.get(&(submission_id, voter_id)) {
            Some(vote) if vote.round_id == round_id => {
                state.votes.remove(&(submission_id, voter_id));
                Ok(())
            }
            _ => Err(DomainError::VoteNotFound),
        }
    }
}

// ============================================================================
// Reactions & comments
// ============================================================================

#[async_trait]
impl ReactionRepository for MemoryStore {
    async fn toggle(&self, reaction: &Reaction) -> RepoResult<bool> {
        let mut state = self.state.lock();
        let position = state.reactions.iter().position(|r| {
            r.submission_id == reaction.submission_id
                && r.user_id == reaction.user_id
                && r.emoji == reaction.emoji
        });

        match position {
            Some(index) => {
                state.reactions.remove(index);
                Ok(false)
            }
            None => {
                state.reactions.push(reaction.clone());
                Ok(true)
            }
        }
    }

    async fn find_by_submission(&self, submission_id: Snowflake) -> RepoResult<Vec<Reaction>> {
        let state = self.state.lock();
        Ok(state
            .reactions
            .iter()
            .filter(|r| r.submission_id == submission_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Comment>> {
        Ok(self.state.lock().comments.get(&id).cloned())
    }

    async fn find_by_submission(&self, submission_id: Snowflake) -> RepoResult<Vec<Comment>> {
        let state = self.state.lock();
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.submission_id == submission_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    async fn create(&self, comment: &Comment) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.comments.contains_key(&comment.id) {
            return Err(DomainError::DuplicateEntry("comment".into()));
        }
        state.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.state
            .lock()
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(DomainError::CommentNotFound(id))
    }
}

// ============================================================================
// Moderation
// ============================================================================

fn apply_effect(
    state: &mut State,
    effect: &ModerationEffect,
    at: DateTime<Utc>,
) -> Result<(), DomainError> {
    match effect {
        ModerationEffect::Kick {
            league_id,
            user_id,
            expected_role,
        } => {
            let member = state
                .active_member_mut(*league_id, *user_id)
                .ok_or(DomainError::MemberNotFound)?;
            if member.role != *expected_role {
                return Err(stale_role(Some(*expected_role), Some(member.role)));
            }
            member.remove(at);
        }
        ModerationEffect::Ban {
            league_id,
            user_id,
            expected_role,
            placeholder_id,
            reason,
        } => {
            if state.is_banned(*league_id, *user_id) {
                return Err(DomainError::AlreadyBanned);
            }
            let actual = state.active_member(*league_id, *user_id).map(|m| m.role);
            if actual != *expected_role {
                return Err(stale_role(*expected_role, actual));
            }

            match state.active_member_mut(*league_id, *user_id) {
                Some(member) => member.ban(reason.clone(), at),
                None => {
                    let mut row = LeagueMember::banned_outsider(
                        *placeholder_id,
                        *league_id,
                        *user_id,
                        reason.clone(),
                        at,
                    );
                    row.remove(at);
                    state.members.push(row);
                }
            }
        }
        ModerationEffect::Unban { league_id, user_id } => {
            state
                .outstanding_ban_mut(*league_id, *user_id)
                .ok_or(DomainError::NotBanned)?
                .lift_ban(at);
        }
        ModerationEffect::ChangeRole {
            league_id,
            user_id,
            from,
            to,
        } => {
            let member = state
                .active_member_mut(*league_id, *user_id)
                .ok_or(DomainError::MemberNotFound)?;
            if member.role != *from {
                return Err(stale_role(Some(*from), Some(member.role)));
            }
            member.role = *to;
        }
    }
    Ok(())
}

#[async_trait]
impl ModerationRepository for MemoryStore {
    #[instrument(skip(self, effect, entry), fields(action = entry.action.as_str(), target_id = %entry.target_id))]
    async fn apply(&self, effect: &ModerationEffect, entry: &ModerationLogEntry) -> RepoResult<()> {
        let mut state = self.state.lock();
        apply_effect(&mut state, effect, entry.created_at)?;
        state.moderation_log.push(entry.clone());
        Ok(())
    }

    async fn find_log(
        &self,
        league_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationLogEntry>> {
        let state = self.state.lock();
        let mut entries: Vec<ModerationLogEntry> = state
            .moderation_log
            .iter()
            .filter(|e| e.league_id == league_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        entries.truncate(usize::try_from(limit.clamp(1, 500)).unwrap_or(500));
        Ok(entries)
    }
}

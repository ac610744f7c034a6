//! API Integration Tests
//!
//! Each test starts its own server over the in-memory backend, so no
//! external services are needed.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use futures::future::join_all;
use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, TestServer, TestUser,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// A league owned by `owner` plus one unlimited invite for it
async fn league_with_invite(server: &TestServer, owner: &TestUser) -> (LeagueResponse, InviteResponse) {
    let response = server
        .post_auth("/leagues", owner, &CreateLeagueRequest::points("Friday Tunes"))
        .await
        .unwrap();
    let league: LeagueResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_empty(&format!("/leagues/{}/invites", league.id), owner)
        .await
        .unwrap();
    let invite: InviteResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    (league, invite)
}

async fn join(server: &TestServer, invite: &InviteResponse, name: &str) -> TestUser {
    let user = server.user(name).unwrap();
    let response = server
        .post_empty(&format!("/invites/{}", invite.code), &user)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    user
}

async fn submit(server: &TestServer, round_id: &str, user: &TestUser, title: &str) -> SubmissionResponse {
    let response = server
        .post_auth(
            &format!("/rounds/{round_id}/submissions"),
            user,
            &track(title, "Some Band"),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn vote(server: &TestServer, submission_id: &str, voter: &TestUser, value: i32) {
    let response = server
        .put_auth(&format!("/submissions/{submission_id}/vote"), voter, &points(value))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

async fn advance(server: &TestServer, round_id: &str, owner: &TestUser) -> RoundResponse {
    let response = server
        .post_empty(&format!("/rounds/{round_id}/advance"), owner)
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health & Auth
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let server = TestServer::start().await.unwrap();
    let response = server.get("/leagues/@me").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let server = TestServer::start().await.unwrap();
    let user = server.user("alice").unwrap();
    let response = server.get_auth("/leagues/not-an-id", &user).await.unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");
}

// ============================================================================
// Leagues & Invites
// ============================================================================

#[tokio::test]
async fn test_create_league_makes_caller_owner() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, _) = league_with_invite(&server, &owner).await;
    assert_eq!(league.owner_id, owner.id.to_string());

    let response = server.get_auth("/leagues/@me", &owner).await.unwrap();
    let mine: Vec<LeagueResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Friday Tunes");
    assert_eq!(mine[0].my_role.as_deref(), Some("owner"));
}

#[tokio::test]
async fn test_invite_preview_is_public() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (_, invite) = league_with_invite(&server, &owner).await;

    let response = server
        .get(&format!("/invites/{}", invite.link_token))
        .await
        .unwrap();
    let preview: InvitePreviewResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(preview.league_name, "Friday Tunes");
    assert_eq!(preview.member_count, 1);
    assert!(preview.usable);
    assert_eq!(preview.remaining_uses, None);
}

#[tokio::test]
async fn test_redeem_twice_fails_without_double_join() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, invite) = league_with_invite(&server, &owner).await;

    let user = server.user("bob").unwrap();
    let response = server
        .post_empty(&format!("/invites/{}", invite.link_token), &user)
        .await
        .unwrap();
    let joined: RedeemInviteResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(joined.league.id, league.id);
    assert_eq!(joined.member.role, "member");

    let response = server
        .post_empty(&format!("/invites/{}", invite.code), &user)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();

    let response = server
        .get_auth(&format!("/leagues/{}/members", league.id), &owner)
        .await
        .unwrap();
    let members: Vec<MemberResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_concurrent_redeem_respects_max_uses() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let response = server
        .post_auth("/leagues", &owner, &CreateLeagueRequest::points("Crowded"))
        .await
        .unwrap();
    let league: LeagueResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth(
            &format!("/leagues/{}/invites", league.id),
            &owner,
            &json!({ "max_uses": 3 }),
        )
        .await
        .unwrap();
    let invite: InviteResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(invite.max_uses, Some(3));

    let users: Vec<TestUser> = (0..10)
        .map(|i| server.user(&format!("racer{i}")).unwrap())
        .collect();
    let path = format!("/invites/{}", invite.code);
    let statuses: Vec<StatusCode> = join_all(users.iter().map(|user| {
        let path = path.clone();
        let server = &server;
        async move { server.post_empty(&path, user).await.unwrap().status() }
    }))
    .await;

    let joined = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    assert_eq!(joined, 3, "statuses: {statuses:?}");
    assert!(statuses
        .iter()
        .all(|s| *s == StatusCode::OK || *s == StatusCode::UNPROCESSABLE_ENTITY));

    let response = server.get(&path).await.unwrap();
    let preview: InvitePreviewResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(preview.member_count, 4);
    assert_eq!(preview.remaining_uses, Some(0));
    assert!(!preview.usable);
}

#[tokio::test]
async fn test_banned_user_cannot_redeem() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, invite) = league_with_invite(&server, &owner).await;
    let troll = join(&server, &invite, "troll").await;

    let response = server
        .put_auth(
            &format!("/leagues/{}/bans/{}", league.id, troll.id),
            &owner,
            &json!({ "reason": "spam" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .post_empty(&format!("/invites/{}", invite.code), &troll)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "USER_BANNED");

    let response = server
        .get_auth(&format!("/leagues/{}/moderation-log", league.id), &owner)
        .await
        .unwrap();
    let log: Vec<ModerationLogEntry> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, "ban");
    assert_eq!(log[0].target_id, troll.id.to_string());
}

#[tokio::test]
async fn test_revoked_invite_is_gone() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (_, invite) = league_with_invite(&server, &owner).await;

    let response = server
        .delete_auth(&format!("/invites/{}", invite.code), &owner)
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let user = server.user("late").unwrap();
    let response = server
        .post_empty(&format!("/invites/{}", invite.code), &user)
        .await
        .unwrap();
    assert_status(response, StatusCode::NOT_FOUND).await.unwrap();
}

// ============================================================================
// Rounds
// ============================================================================

#[tokio::test]
async fn test_non_members_are_forbidden() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, _) = league_with_invite(&server, &owner).await;
    let stranger = server.user("stranger").unwrap();

    let response = server
        .get_auth(&format!("/leagues/{}/rounds", league.id), &stranger)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_phase_gating() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, invite) = league_with_invite(&server, &owner).await;
    let alice = join(&server, &invite, "alice").await;
    let bob = join(&server, &invite, "bob").await;

    let response = server
        .post_auth(
            &format!("/leagues/{}/rounds", league.id),
            &owner,
            &open_round("Songs about rain"),
        )
        .await
        .unwrap();
    let round: RoundResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(round.status, "submitting");
    assert!(round.allowed_actions.iter().any(|a| a == "submit"));

    let sub = submit(&server, &round.id, &alice, "Rain").await;
    assert!(sub.is_mine);

    // No ballots while submitting
    let response = server
        .put_auth(&format!("/submissions/{}/vote", sub.id), &bob, &points(3))
        .await
        .unwrap();
    assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();

    // Second submission in a single-submission league
    let response = server
        .post_auth(
            &format!("/rounds/{}/submissions", round.id),
            &alice,
            &track("Drizzle", "Other Band"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();

    let round = advance(&server, &round.id, &owner).await;
    assert_eq!(round.status, "voting");

    // No submissions while voting
    let response = server
        .post_auth(
            &format!("/rounds/{}/submissions", round.id),
            &bob,
            &track("Late", "Late Band"),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();

    // Self-votes are refused
    let response = server
        .put_auth(&format!("/submissions/{}/vote", sub.id), &alice, &points(5))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();
    assert_eq!(code, "SELF_VOTE");

    // Standings stay hidden until reveal
    let response = server
        .get_auth(&format!("/rounds/{}/standings", round.id), &bob)
        .await
        .unwrap();
    assert_status(response, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();
}

#[tokio::test]
async fn test_members_cannot_advance_rounds() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, invite) = league_with_invite(&server, &owner).await;
    let alice = join(&server, &invite, "alice").await;

    let response = server
        .post_auth(
            &format!("/leagues/{}/rounds", league.id),
            &owner,
            &open_round("Covers"),
        )
        .await
        .unwrap();
    let round: RoundResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_empty(&format!("/rounds/{}/advance", round.id), &alice)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

#[tokio::test]
async fn test_submissions_are_anonymous_until_reveal() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, invite) = league_with_invite(&server, &owner).await;
    let alice = join(&server, &invite, "alice").await;
    let bob = join(&server, &invite, "bob").await;

    let response = server
        .post_auth(
            &format!("/leagues/{}/rounds", league.id),
            &owner,
            &open_round("Deep cuts"),
        )
        .await
        .unwrap();
    let round: RoundResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    submit(&server, &round.id, &alice, "B-side").await;

    let path = format!("/rounds/{}/submissions", round.id);
    let response = server.get_auth(&path, &bob).await.unwrap();
    let listed: Vec<SubmissionResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(listed[0].title, "B-side");
    assert_eq!(listed[0].user_id, None);

    advance(&server, &round.id, &owner).await;
    advance(&server, &round.id, &owner).await;

    let response = server.get_auth(&path, &bob).await.unwrap();
    let listed: Vec<SubmissionResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(listed[0].user_id.as_deref(), Some(alice.id.to_string().as_str()));
}

// ============================================================================
// Results
// ============================================================================

#[tokio::test]
async fn test_tied_scores_rank_by_submission_order() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, invite) = league_with_invite(&server, &owner).await;
    let alice = join(&server, &invite, "alice").await;
    let bob = join(&server, &invite, "bob").await;
    let carol = join(&server, &invite, "carol").await;
    let dave = join(&server, &invite, "dave").await;

    let response = server
        .post_auth(
            &format!("/leagues/{}/rounds", league.id),
            &owner,
            &open_round("Opening tracks"),
        )
        .await
        .unwrap();
    let round: RoundResponse = assert_json(response, StatusCode::CREATED).await.unwrap();

    let a = submit(&server, &round.id, &alice, "First").await;
    let b = submit(&server, &round.id, &bob, "Second").await;
    let c = submit(&server, &round.id, &carol, "Third").await;
    advance(&server, &round.id, &owner).await;

    vote(&server, &a.id, &owner, 5).await;
    vote(&server, &b.id, &owner, 4).await;
    vote(&server, &a.id, &dave, 2).await;
    vote(&server, &b.id, &dave, 3).await;
    vote(&server, &c.id, &dave, 3).await;

    let revealed = advance(&server, &round.id, &owner).await;
    assert_eq!(revealed.status, "revealed");

    let response = server
        .get_auth(&format!("/rounds/{}/standings", round.id), &carol)
        .await
        .unwrap();
    let standings: RoundStandingsResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(standings.status, "revealed");
    let order: Vec<(u32, String, i64)> = standings
        .standings
        .iter()
        .map(|s| (s.placement, s.user_id.clone(), s.score))
        .collect();
    assert_eq!(
        order,
        vec![
            (1, alice.id.to_string(), 7),
            (2, bob.id.to_string(), 7),
            (3, carol.id.to_string(), 3),
        ]
    );

    let response = server
        .get_auth(&format!("/leagues/{}/leaderboard", league.id), &dave)
        .await
        .unwrap();
    let board: LeaderboardResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(board.rows[0].user_id, alice.id.to_string());
    assert_eq!(board.rows[0].rank, 1);
    assert_eq!(board.rows[0].wins, 1);
    assert_eq!(board.rows[1].total_points, 7);
    assert_eq!(board.rows[1].wins, 0);

    // Ballots become public after reveal
    let response = server
        .get_auth(&format!("/rounds/{}/votes", round.id), &alice)
        .await
        .unwrap();
    let votes: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(votes.len(), 5);
}

#[tokio::test]
async fn test_revert_discards_votes() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, invite) = league_with_invite(&server, &owner).await;
    let alice = join(&server, &invite, "alice").await;
    let bob = join(&server, &invite, "bob").await;

    let response = server
        .post_auth(
            &format!("/leagues/{}/rounds", league.id),
            &owner,
            &open_round("Redo"),
        )
        .await
        .unwrap();
    let round: RoundResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let sub = submit(&server, &round.id, &alice, "Again").await;
    advance(&server, &round.id, &owner).await;
    vote(&server, &sub.id, &bob, 4).await;

    let response = server
        .post_empty(&format!("/rounds/{}/revert", round.id), &owner)
        .await
        .unwrap();
    let reverted: RoundResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(reverted.status, "submitting");

    let response = server
        .get_auth(&format!("/rounds/{}/votes", round.id), &bob)
        .await
        .unwrap();
    let votes: Vec<Value> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(votes.is_empty());

    // A second revert has no voting phase to leave
    let response = server
        .post_empty(&format!("/rounds/{}/revert", round.id), &owner)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();
    assert_eq!(code, "ILLEGAL_TRANSITION");
}

#[tokio::test]
async fn test_reactions_toggle_and_comments() {
    let server = TestServer::start().await.unwrap();
    let owner = server.user("owner").unwrap();
    let (league, invite) = league_with_invite(&server, &owner).await;
    let alice = join(&server, &invite, "alice").await;

    let response = server
        .post_auth(
            &format!("/leagues/{}/rounds", league.id),
            &owner,
            &open_round("Summer"),
        )
        .await
        .unwrap();
    let round: RoundResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    let sub = submit(&server, &round.id, &alice, "Heatwave").await;
    advance(&server, &round.id, &owner).await;

    let path = format!("/submissions/{}/reactions/fire", sub.id);
    let response = server.put_empty(&path, &owner).await.unwrap();
    let toggled: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(toggled["reacted"], true);
    let response = server.put_empty(&path, &owner).await.unwrap();
    let toggled: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(toggled["reacted"], false);

    let response = server
        .post_auth(
            &format!("/submissions/{}/comments", sub.id),
            &owner,
            &json!({ "content": "great pick" }),
        )
        .await
        .unwrap();
    let comment: Value = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .delete_auth(&format!("/comments/{}", comment["id"].as_str().unwrap()), &alice)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}

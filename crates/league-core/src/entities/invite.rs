//! Invite entity - a redeemable ticket into a league
//!
//! Each invite carries two handles: a short `code` people can type, and an
//! unguessable `link_token` that goes into share links. Either one redeems.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::{Rng, RngCore};

use crate::value_objects::Snowflake;

/// Length of generated codes unless configured otherwise
pub const DEFAULT_INVITE_CODE_LENGTH: usize = 8;

const LINK_TOKEN_BYTES: usize = 24;

/// Invite entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    pub code: String,
    pub link_token: String,
    pub league_id: Snowflake,
    pub created_by: Snowflake,
    pub uses: i32,
    pub max_uses: Option<i32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn new(
        code: String,
        link_token: String,
        league_id: Snowflake,
        created_by: Snowflake,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            link_token,
            league_id,
            created_by,
            uses: 0,
            max_uses: None,
            expires_at: None,
            created_at: now,
        }
    }

    pub fn with_expiration(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Zero or negative means unlimited
    pub fn with_max_uses(mut self, max_uses: Option<i32>) -> Self {
        self.max_uses = max_uses.filter(|max| *max > 0);
        self
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.uses >= max)
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && !self.is_exhausted()
    }

    /// None if unlimited
    pub fn remaining_uses(&self) -> Option<i32> {
        self.max_uses.map(|max| (max - self.uses).max(0))
    }

    /// Whether `handle` names this invite by code or by link token
    pub fn matches(&self, handle: &str) -> bool {
        self.code == handle || self.link_token == handle
    }
}

/// Generate a random alphanumeric invite code
pub fn generate_invite_code(len: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";

    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Generate an opaque URL-safe link token
pub fn generate_link_token() -> String {
    let mut bytes = [0u8; LINK_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invite() -> Invite {
        Invite::new(
            "abcd2345".to_string(),
            generate_link_token(),
            Snowflake::new(1),
            Snowflake::new(2),
            Utc::now(),
        )
    }

    #[test]
    fn test_invite_capacity() {
        let mut invite = invite().with_max_uses(Some(2));
        assert_eq!(invite.remaining_uses(), Some(2));
        assert!(invite.is_usable(Utc::now()));

        invite.uses = 2;
        assert!(invite.is_exhausted());
        assert_eq!(invite.remaining_uses(), Some(0));
        assert!(!invite.is_usable(Utc::now()));
    }

    #[test]
    fn test_non_positive_max_uses_is_unlimited() {
        let invite = invite().with_max_uses(Some(0));
        assert_eq!(invite.max_uses, None);
        assert!(!invite.is_exhausted());
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let invite = invite().with_expiration(Some(now + Duration::minutes(5)));
        assert!(!invite.is_expired(now));
        assert!(invite.is_expired(now + Duration::minutes(5)));
    }

    #[test]
    fn test_matches_code_or_token() {
        let invite = invite();
        assert!(invite.matches("abcd2345"));
        assert!(invite.matches(&invite.link_token.clone()));
        assert!(!invite.matches("nope"));
    }

    #[test]
    fn test_generated_handles() {
        let code = generate_invite_code(DEFAULT_INVITE_CODE_LENGTH);
        assert_eq!(code.len(), DEFAULT_INVITE_CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));

        let token = generate_link_token();
        assert_eq!(token.len(), 32);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, generate_link_token());
    }
}

//! Snowflake identifiers
//!
//! Layout of the 64-bit value:
//! - Bits 63-22: milliseconds since [`Snowflake::EPOCH`]
//! - Bits 21-12: node id (0-1023)
//! - Bits 11-0:  per-millisecond sequence (0-4095)

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

const NODE_BITS: i64 = 10;
const SEQUENCE_BITS: i64 = 12;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const MAX_NODE_ID: u16 = 1 << NODE_BITS;

/// 64-bit time-ordered identifier used for every league entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// 2025-01-01 00:00:00 UTC in milliseconds
    pub const EPOCH: i64 = 1_735_689_600_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Milliseconds since the Unix epoch encoded in this id
    #[inline]
    pub fn timestamp_millis(&self) -> i64 {
        (self.0 >> (NODE_BITS + SEQUENCE_BITS)) + Self::EPOCH
    }

    #[inline]
    pub fn node_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & i64::from(MAX_NODE_ID - 1)) as u16
    }

    /// Creation time encoded in this id
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.timestamp_millis())
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Error when parsing a Snowflake from text
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid snowflake id")]
pub struct SnowflakeParseError;

impl FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

// JSON clients cannot hold 64-bit integers, so ids travel as strings
impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Snowflake(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_millis: i64,
    sequence: i64,
}

/// Thread-safe Snowflake generator
///
/// Ids from one generator are strictly increasing. Up to 4096 ids are issued
/// per millisecond; beyond that the generator waits for the next tick.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    node_id: u16,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    /// Create a generator for the given node. Node ids wrap into 0..1024.
    pub fn new(node_id: u16) -> Self {
        Self {
            node_id: node_id % MAX_NODE_ID,
            state: Mutex::new(GeneratorState::default()),
        }
    }

    pub fn node_id(&self) -> u16 {
        self.node_id
    }

    pub fn generate(&self) -> Snowflake {
        let mut state = self.state.lock();
        let mut now = current_millis().max(state.last_millis);

        if now == state.last_millis {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                while now <= state.last_millis {
                    std::hint::spin_loop();
                    now = current_millis();
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_millis = now;

        Snowflake::new(
            ((now - Snowflake::EPOCH) << (NODE_BITS + SEQUENCE_BITS))
                | (i64::from(self.node_id) << SEQUENCE_BITS)
                | state.sequence,
        )
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(Snowflake::EPOCH)
}

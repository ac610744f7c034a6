//! Value objects - immutable types that represent domain concepts

mod role;
mod round_status;
mod scoring;
mod snowflake;

pub use role::MemberRole;
pub use round_status::{can_transition, RoundActions, RoundStatus};
pub use scoring::{EmptyRoundPolicy, ScoringMode, VoteValue};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};

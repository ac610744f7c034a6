//! Entity to model mappers
//!
//! This module provides conversions between domain entities (league-core) and database models.
//! - `From<Model> for Entity` / `TryFrom<Model> for Entity`: rows to domain objects.
//!   Text-encoded enums make most conversions fallible; a bad value is a
//!   corrupted row and surfaces as `DatabaseError`.
//! - `*Insert` structs: entity data flattened to bindable columns

mod invite;
mod league;
mod member;
mod moderation;
mod round;
mod submission;
mod vote;

use league_core::DomainError;

pub use league::LeagueInsert;
pub use round::RoundInsert;
pub use submission::SubmissionInsert;
pub use vote::VoteInsert;

/// Convert a batch of rows, failing on the first corrupted one
pub fn convert_all<M, E>(rows: Vec<M>) -> Result<Vec<E>, DomainError>
where
    E: TryFrom<M, Error = DomainError>,
{
    rows.into_iter().map(E::try_from).collect()
}

/// Parse a text column into a domain enum
pub(crate) fn parse_column<T>(column: &'static str, raw: &str) -> Result<T, DomainError>
where
    T: std::str::FromStr,
{
    raw.parse()
        .map_err(|_| DomainError::DatabaseError(format!("corrupted {column} value: {raw}")))
}

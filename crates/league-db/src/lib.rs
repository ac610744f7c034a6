//! # league-db
//!
//! Storage layer implementing the `league-core` repository traits.
//!
//! ## Overview
//!
//! Two backends live here:
//!
//! - PostgreSQL via SQLx: connection pool, embedded-on-disk migrations,
//!   `FromRow` models, entity mappers and the `Pg*Repository` types.
//! - [`MemoryStore`]: a single in-process store behind one lock that
//!   implements every repository trait with the same atomicity guarantees.
//!   It backs `STORAGE_BACKEND=memory` and the test suites.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use league_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use league_db::repositories::PgRoundRepository;
//! use league_core::traits::RoundRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::new("postgres://localhost/music_league", 10, 1);
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let rounds = PgRoundRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, DatabaseConfig};
pub use sqlx::postgres::PgPool;
pub use repositories::{
    PgCommentRepository, PgInviteRepository, PgLeagueRepository, PgMemberRepository,
    PgModerationRepository, PgReactionRepository, PgRoundRepository, PgSeasonRepository,
    PgSubmissionRepository, PgVoteRepository,
};

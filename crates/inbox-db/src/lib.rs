//! # inbox-db
//!
//! Storage layer implementing the `inbox-core` repository traits.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx (`PgUserRepository`,
//!   `PgConversationRepository`, `PgMessageRepository`)
//! - Schema setup (`run_migrations`)
//! - [`MemoryStore`], a process-local implementation of every repository
//!   trait used for tests and database-less development
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inbox_common::DatabaseConfig;
//! use inbox_db::{create_pool, run_migrations, PgConversationRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::new("postgres://localhost/inbox")).await?;
//!     run_migrations(&pool).await?;
//!     let conversations = PgConversationRepository::new(pool);
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
pub use pool::{create_pool, ping, run_migrations, PgPool};
pub use repositories::{PgConversationRepository, PgMessageRepository, PgUserRepository};

//! # hr-db
//!
//! Storage layer for hrdash.
//!
//! - Connection pool management and embedded migrations
//! - The [`Store`] trait every service reads and writes through
//! - Atomic [`WriteBatch`]es
//! - A Postgres implementation ([`PgStore`]) and an in-memory one ([`MemoryStore`])
//!
//! ## Example
//!
//! ```ignore
//! use hr_db::{Database, DatabaseConfig, PgStore, Store};
//!
//! let db = Database::connect(&DatabaseConfig::from(&app_config.database)).await?;
//! db.migrate().await?;
//! let store = PgStore::new(db.pool().clone());
//! let branches = store.list_branches().await?;
//! ```

pub mod pool;
pub mod repository;
pub mod batch;
pub mod memory;
pub mod pg_store;
pub mod branches;
pub mod departments;
pub mod employees;
pub mod scorecards;
pub mod overtime;
pub mod users;

// Re-exports
pub use pool::{Database, DatabaseConfig, PoolStats};
pub use repository::{OvertimeFilter, RepositoryError, RepositoryResult, Store};
#[cfg(any(test, feature = "mocks"))]
pub use repository::MockStore;
pub use batch::{WriteBatch, WriteOp};
pub use memory::MemoryStore;
pub use pg_store::PgStore;

//! SQLite storage implementation for MarketSync.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the store trait defined in `marketsync-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The instrument repository
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//!
//! ```text
//!          core (domain)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod instruments;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use instruments::InstrumentRepository;

// Re-export from marketsync-core for convenience
pub use marketsync_core::errors::{DatabaseError, Error, Result};

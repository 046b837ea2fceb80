//! MarketSync Core - Domain entities, services, and traits.
//!
//! This crate holds the instrument model, the tracked universe and the refresh
//! orchestrator. It is database-agnostic and defines the store trait that is
//! implemented by the `storage-sqlite` crate.

pub mod errors;
pub mod instruments;
pub mod refresh;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

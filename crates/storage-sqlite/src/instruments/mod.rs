//! SQLite storage implementation for instruments.

mod model;
mod repository;

pub use model::InstrumentDB;
pub use repository::InstrumentRepository;

// Re-export trait from core for convenience
pub use marketsync_core::instruments::InstrumentStore;

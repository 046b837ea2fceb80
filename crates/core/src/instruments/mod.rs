//! Instruments module - domain model, tracked universe and storage trait.

mod model;
mod store;
mod universe;

pub use model::{AssetClass, Instrument};
pub use store::InstrumentStore;
pub use universe::{UniverseEntry, CRYPTO_UNIVERSE, EQUITY_UNIVERSE};

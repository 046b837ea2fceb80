//! Instrument storage trait.

use async_trait::async_trait;

use super::model::Instrument;
use crate::errors::Result;

/// Storage interface for instrument snapshots.
///
/// Reads are synchronous and expected to be fast. Writes are async because
/// implementations may hand them to a dedicated writer.
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    /// Create or replace the record keyed by `instrument.symbol`.
    ///
    /// The write is durable when this returns. Returns the stored record.
    async fn upsert(&self, instrument: Instrument) -> Result<Instrument>;

    /// Get a single instrument by its symbol.
    fn find_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>>;

    /// Get every stored instrument, ordered by symbol.
    fn find_all(&self) -> Result<Vec<Instrument>>;

    fn exists_by_symbol(&self, symbol: &str) -> Result<bool> {
        Ok(self.find_by_symbol(symbol)?.is_some())
    }
}

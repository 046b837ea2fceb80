//! Quote provider trait definition.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::QuoteSample;

use super::capabilities::ProviderCapabilities;

/// Trait for market data providers.
///
/// Each implementation owns its endpoint construction, response parsing and
/// error classification. Every failure comes back as a typed
/// [`MarketDataError`]; nothing an upstream API does should make an adapter
/// panic.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use marketsync_market_data::provider::{ProviderCapabilities, QuoteProvider};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl QuoteProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             quota_constrained: false,
///             includes_weekly_change: true,
///         }
///     }
///
///     async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSample, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "ALPHA_VANTAGE".
    /// Used for logging and as the `source` of produced samples.
    fn id(&self) -> &'static str;

    /// Describes how the orchestrator should drive this provider.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch the latest snapshot for a provider-specific symbol or id.
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSample, MarketDataError>;

    /// Derive the week-over-week percentage change for a symbol.
    ///
    /// Only providers whose snapshot lacks the weekly change implement this.
    /// The default reports `NoData`.
    async fn fetch_weekly_change(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        Err(MarketDataError::NoData {
            provider: self.id().to_string(),
            symbol: symbol.to_string(),
        })
    }
}

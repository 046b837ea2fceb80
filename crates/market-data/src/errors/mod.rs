//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum returned by every adapter call and derived metric
//! - [`FailureScope`]: Classification for deciding what a failure skips

mod scope;

pub use scope::FailureScope;

use thiserror::Error;

/// Errors that can occur while fetching or deriving market data.
///
/// None of these are fatal to a refresh cycle. Each variant maps to a
/// [`FailureScope`] via [`scope`](Self::scope), which tells the orchestrator
/// whether to drop a metric, a symbol, or the rest of a provider's phase.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider signaled quota exhaustion, either with HTTP 429 or
    /// with a notice embedded in an otherwise successful payload.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// A well-formed response that lacks the expected payload.
    #[error("No data from {provider} for {symbol}")]
    NoData {
        /// The provider that was queried
        provider: String,
        /// The provider-specific symbol or id
        symbol: String,
    },

    /// The response could not be parsed.
    #[error("Malformed response from {provider}: {message}")]
    Malformed {
        /// The provider that returned the payload
        provider: String,
        /// What failed to parse
        message: String,
    },

    /// Network or IO failure, including timeouts and unexpected HTTP statuses.
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider that could not be reached
        provider: String,
        /// The underlying failure
        message: String,
    },

    /// A derived metric could not be computed (e.g. division by zero).
    #[error("Computation error: {0}")]
    Computation(String),
}

impl MarketDataError {
    /// Returns how far this failure reaches within a refresh cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// use marketsync_market_data::errors::{FailureScope, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: "ALPHA_VANTAGE".to_string() };
    /// assert_eq!(error.scope(), FailureScope::Provider);
    ///
    /// let error = MarketDataError::Computation("division by zero".to_string());
    /// assert_eq!(error.scope(), FailureScope::Metric);
    /// ```
    pub fn scope(&self) -> FailureScope {
        match self {
            Self::RateLimited { .. } => FailureScope::Provider,
            Self::NoData { .. } | Self::Malformed { .. } | Self::Transport { .. } => {
                FailureScope::Symbol
            }
            Self::Computation(_) => FailureScope::Metric,
        }
    }

    /// True when the provider asked us to back off.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub(crate) fn no_data(provider: &str, symbol: &str) -> Self {
        Self::NoData {
            provider: provider.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub(crate) fn malformed(provider: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn transport(provider: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

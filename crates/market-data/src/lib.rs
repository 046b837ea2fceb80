//! Marketsync Market Data Crate
//!
//! Adapters for the upstream quote providers together with the pieces they
//! share: the error taxonomy, the derived percentage metrics and the call
//! budget for quota-constrained providers.
//!
//! # Overview
//!
//! - [`AlphaVantageProvider`] - equity snapshots (GLOBAL_QUOTE) and weekly change
//!   (TIME_SERIES_WEEKLY)
//! - [`CoinGeckoProvider`] - crypto snapshots with 24h and 7d change included
//! - [`RateGovernor`] - fixed-window, non-blocking call budget
//! - [`pct_change`] - percentage change at a fixed four-decimal scale
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |   Orchestrator   | --> |  RateGovernor    |  (may I call?)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  QuoteProvider   | --> |   QuoteSample    |  (parsed snapshot)
//! +------------------+     +------------------+
//! ```
//!
//! Adapters never panic on upstream input. Every failure is a
//! [`MarketDataError`] whose [`FailureScope`] tells the caller how much work to skip.

pub mod errors;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod registry;

pub use models::QuoteSample;

pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::{ProviderCapabilities, QuoteProvider};

pub use registry::{Clock, ManualClock, MonotonicClock, RateGovernor, RateGovernorConfig};

pub use errors::{FailureScope, MarketDataError};
pub use metrics::{pct_change, PCT_SCALE};

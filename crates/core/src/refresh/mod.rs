//! Refresh module - configuration and the orchestrating service.

mod config;
mod service;


pub use config::{
    RefreshConfig, DEFAULT_CRYPTO_CALL_DELAY, DEFAULT_EQUITY_CALL_DELAY, DEFAULT_HTTP_TIMEOUT,
    DEFAULT_INITIAL_DELAY, DEFAULT_QUOTA, DEFAULT_QUOTA_WINDOW, DEFAULT_REFRESH_INTERVAL,
};
pub use service::{
    CycleReport, MarketDataService, PhaseReport, RefreshOutcome, RefreshPhase, RefreshState,
};

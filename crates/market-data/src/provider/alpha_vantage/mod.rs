//! Alpha Vantage equity adapter.
//!
//! This module provides equity snapshots from the Alpha Vantage API:
//! - Latest quote via the GLOBAL_QUOTE endpoint
//! - Week-over-week change via the TIME_SERIES_WEEKLY endpoint
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute, and it
//! reports quota exhaustion inside a 200 response (`Note` / `Information`)
//! rather than with HTTP 429.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::metrics::pct_change;
use crate::models::QuoteSample;
use crate::provider::{parse_decimal, snippet, ProviderCapabilities, QuoteProvider};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Alpha Vantage equity provider.
///
/// Two calls per symbol: the snapshot and the weekly series. Both count
/// against the caller's rate budget.
pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

/// GLOBAL_QUOTE response
#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// The quote object. Alpha Vantage answers an unknown symbol with `{}`,
/// so every field is optional.
#[derive(Debug, Default, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "03. high")]
    high: Option<String>,
    #[serde(rename = "04. low")]
    low: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
}

/// TIME_SERIES_WEEKLY response
#[derive(Debug, Deserialize)]
struct WeeklySeriesResponse {
    #[serde(rename = "Weekly Time Series")]
    time_series: Option<HashMap<String, WeeklyBar>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeeklyBar {
    #[serde(rename = "4. close")]
    close: Option<String>,
}

// ============================================================================
// AlphaVantageProvider implementation
// ============================================================================

impl AlphaVantageProvider {
    /// Create a new Alpha Vantage provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a provider with a custom request timeout.
    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        Self::with_options(api_key, BASE_URL.to_string(), timeout)
    }

    /// Create a provider against a custom endpoint with a custom request timeout.
    pub fn with_options(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Make a request to the Alpha Vantage API and return the raw body.
    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", self.api_key.as_str()));

        let url = reqwest::Url::parse_with_params(&self.base_url, &all_params).map_err(|e| {
            MarketDataError::transport(PROVIDER_ID, format!("Failed to build URL: {}", e))
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::transport(PROVIDER_ID, "request timed out")
            } else {
                MarketDataError::transport(PROVIDER_ID, e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::transport(
                PROVIDER_ID,
                format!("HTTP {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::transport(PROVIDER_ID, e.to_string()))
    }

    /// Classify the notice fields Alpha Vantage embeds in a 200 response.
    fn check_notices(
        symbol: &str,
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            warn!("Alpha Vantage error for {}: {}", symbol, msg);
            return Err(MarketDataError::no_data(PROVIDER_ID, symbol));
        }

        let Some(msg) = note.as_ref().or(information.as_ref()) else {
            return Ok(());
        };

        let lowered = msg.to_lowercase();
        if lowered.contains("call frequency") || lowered.contains("rate limit") {
            warn!("Alpha Vantage API limit reached: {}", msg);
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        warn!("Alpha Vantage notice for {}: {}", symbol, msg);
        Err(MarketDataError::no_data(PROVIDER_ID, symbol))
    }

    fn parse_field(name: &str, value: &Option<String>) -> Result<Option<Decimal>, MarketDataError> {
        match value {
            None => Ok(None),
            Some(raw) => parse_decimal(raw).map(Some).ok_or_else(|| {
                MarketDataError::malformed(PROVIDER_ID, format!("invalid {}: {:?}", name, raw))
            }),
        }
    }

    /// Turn a GLOBAL_QUOTE body into a sample.
    ///
    /// The daily change is derived from price and previous close. A zero
    /// previous close loses only that metric.
    fn parse_global_quote(
        symbol: &str,
        body: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<QuoteSample, MarketDataError> {
        let response: GlobalQuoteResponse = serde_json::from_str(body).map_err(|e| {
            MarketDataError::malformed(PROVIDER_ID, format!("Failed to parse response: {}", e))
        })?;

        Self::check_notices(
            symbol,
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let quote = response.global_quote.unwrap_or_default();
        let price = match Self::parse_field("price", &quote.price)? {
            Some(price) => price,
            None => {
                warn!(
                    "No data found for stock: {}. Response: {}",
                    symbol,
                    snippet(body)
                );
                return Err(MarketDataError::no_data(PROVIDER_ID, symbol));
            }
        };

        let previous_close = Self::parse_field("previous close", &quote.previous_close)?;
        let mut sample = QuoteSample::new(fetched_at, price, PROVIDER_ID).with_range(
            Self::parse_field("high", &quote.high)?,
            Self::parse_field("low", &quote.low)?,
            Self::parse_field("volume", &quote.volume)?,
        );
        sample.previous_close = previous_close;
        sample.daily_change_pct = match previous_close {
            Some(prior) => match pct_change(price, prior) {
                Ok(change) => Some(change),
                Err(e) => {
                    warn!("Skipping daily change for {}: {}", symbol, e);
                    None
                }
            },
            None => None,
        };

        Ok(sample)
    }

    /// Derive the weekly change from a TIME_SERIES_WEEKLY body.
    ///
    /// Period keys are parsed as dates and ordered newest first; the JSON
    /// object order is not relied upon. Keys that are not dates are ignored.
    fn parse_weekly_change(symbol: &str, body: &str) -> Result<Decimal, MarketDataError> {
        let response: WeeklySeriesResponse = serde_json::from_str(body).map_err(|e| {
            MarketDataError::malformed(PROVIDER_ID, format!("Failed to parse response: {}", e))
        })?;

        Self::check_notices(
            symbol,
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let time_series = response.time_series.unwrap_or_default();

        let mut periods: Vec<(NaiveDate, &WeeklyBar)> = time_series
            .iter()
            .filter_map(|(key, bar)| {
                NaiveDate::parse_from_str(key, "%Y-%m-%d")
                    .ok()
                    .map(|date| (date, bar))
            })
            .collect();
        periods.sort_by(|a, b| b.0.cmp(&a.0));

        let (current, prior) = match periods.as_slice() {
            [current, prior, ..] => (current, prior),
            _ => {
                warn!("Insufficient weekly data points for {}", symbol);
                return Err(MarketDataError::no_data(PROVIDER_ID, symbol));
            }
        };

        let close = |(date, bar): &(NaiveDate, &WeeklyBar)| {
            Self::parse_field("weekly close", &bar.close)?.ok_or_else(|| {
                MarketDataError::malformed(PROVIDER_ID, format!("missing close for week {}", date))
            })
        };

        let current_close = close(current)?;
        let prior_close = close(prior)?;

        debug!(
            "Alpha Vantage weekly closes for {}: {} ({}) vs {} ({})",
            symbol, current_close, current.0, prior_close, prior.0
        );

        pct_change(current_close, prior_close)
    }
}

// ============================================================================
// QuoteProvider trait implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            quota_constrained: true,
            includes_weekly_change: false,
        }
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSample, MarketDataError> {
        debug!("Fetching stock data for {}", symbol);
        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol)];
        let body = self.fetch(&params).await?;
        Self::parse_global_quote(symbol, &body, Utc::now())
    }

    async fn fetch_weekly_change(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        debug!("Fetching weekly change for {}", symbol);
        let params = [("function", "TIME_SERIES_WEEKLY"), ("symbol", symbol)];
        let body = self.fetch(&params).await?;
        Self::parse_weekly_change(symbol, &body)
    }
}

//! CoinGecko crypto adapter.
//!
//! One call per coin against `/coins/{id}` returns the spot price together
//! with the 24h and 7d percentage changes, so no derivation is needed here.
//! The public API needs no key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::metrics::PCT_SCALE;
use crate::models::QuoteSample;
use crate::provider::{parse_decimal, snippet, ProviderCapabilities, QuoteProvider};

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER_ID: &str = "COINGECKO";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Only the market block is needed; everything else is switched off.
const COIN_QUERY: &[(&str, &str)] = &[
    ("localization", "false"),
    ("tickers", "false"),
    ("market_data", "true"),
    ("community_data", "false"),
    ("developer_data", "false"),
];

pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a provider with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_options(BASE_URL.to_string(), timeout)
    }

    /// Create a provider against a custom endpoint with a custom request timeout.
    pub fn with_options(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }

    /// Map a non-success status to an error. 429 is the only status that
    /// means the provider wants us to back off.
    fn check_status(status: StatusCode, coin_id: &str) -> Result<(), MarketDataError> {
        if status.is_success() {
            return Ok(());
        }

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("CoinGecko rate limit hit for {}", coin_id);
                Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                })
            }
            StatusCode::NOT_FOUND => Err(MarketDataError::no_data(PROVIDER_ID, coin_id)),
            _ => Err(MarketDataError::transport(
                PROVIDER_ID,
                format!("HTTP {}", status),
            )),
        }
    }

    /// Read a JSON number (or numeric string) as a decimal.
    fn as_decimal(value: Option<&Value>) -> Option<Decimal> {
        match value? {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s),
            _ => None,
        }
    }

    fn usd(market_data: &Value, field: &str) -> Option<Decimal> {
        Self::as_decimal(market_data.get(field).and_then(|v| v.get("usd")))
    }

    fn round_pct(value: Decimal) -> Decimal {
        let mut rounded =
            value.round_dp_with_strategy(PCT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(PCT_SCALE);
        rounded
    }

    /// Turn a `/coins/{id}` body into a sample.
    fn parse_coin(
        coin_id: &str,
        body: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<QuoteSample, MarketDataError> {
        let json: Value = serde_json::from_str(body).map_err(|e| {
            MarketDataError::malformed(PROVIDER_ID, format!("Failed to parse response: {}", e))
        })?;

        let Some(market_data) = json.get("market_data").filter(|v| v.is_object()) else {
            warn!(
                "No market data found for crypto: {}. Response: {}",
                coin_id,
                snippet(body)
            );
            return Err(MarketDataError::no_data(PROVIDER_ID, coin_id));
        };

        let Some(price) = Self::usd(market_data, "current_price") else {
            warn!("No USD price found for crypto: {}", coin_id);
            return Err(MarketDataError::no_data(PROVIDER_ID, coin_id));
        };

        let mut sample = QuoteSample::new(fetched_at, price, PROVIDER_ID).with_range(
            Self::usd(market_data, "high_24h"),
            Self::usd(market_data, "low_24h"),
            Self::usd(market_data, "total_volume"),
        );
        sample.daily_change_pct =
            Self::as_decimal(market_data.get("price_change_percentage_24h")).map(Self::round_pct);
        sample.weekly_change_pct =
            Self::as_decimal(market_data.get("price_change_percentage_7d")).map(Self::round_pct);

        Ok(sample)
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            quota_constrained: false,
            includes_weekly_change: true,
        }
    }

    async fn fetch_quote(&self, coin_id: &str) -> Result<QuoteSample, MarketDataError> {
        let url = format!("{}/coins/{}", self.base_url, coin_id);
        let url = reqwest::Url::parse_with_params(&url, COIN_QUERY).map_err(|e| {
            MarketDataError::transport(PROVIDER_ID, format!("Failed to build URL: {}", e))
        })?;

        debug!("Fetching crypto data for {}", coin_id);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::transport(PROVIDER_ID, "request timed out")
            } else {
                MarketDataError::transport(PROVIDER_ID, e.to_string())
            }
        })?;

        Self::check_status(response.status(), coin_id)?;

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::transport(PROVIDER_ID, e.to_string()))?;

        Self::parse_coin(coin_id, &body, Utc::now())
    }
}

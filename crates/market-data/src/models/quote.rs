use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One provider's snapshot of a single instrument, as parsed from one API call.
///
/// Samples are never stored on their own: the orchestrator folds each one into
/// the matching instrument record and drops it. Every field except `price`
/// is optional so that a metric the provider could not supply (or that could
/// not be derived) leaves the stored value alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteSample {
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,

    /// Current/last traded price (required)
    pub price: Decimal,

    /// Prior-day close used to derive the daily change, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    /// Percentage change over one day, already on a 0-100 scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_change_pct: Option<Decimal>,

    /// Percentage change over seven days, already on a 0-100 scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_change_pct: Option<Decimal>,

    /// Session high
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    /// Session low
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Traded volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Provider that produced the sample (ALPHA_VANTAGE, COINGECKO, ...)
    pub source: String,
}

impl QuoteSample {
    /// Create a sample with only the required fields set.
    pub fn new(timestamp: DateTime<Utc>, price: Decimal, source: impl Into<String>) -> Self {
        Self {
            timestamp,
            price,
            previous_close: None,
            daily_change_pct: None,
            weekly_change_pct: None,
            high: None,
            low: None,
            volume: None,
            source: source.into(),
        }
    }

    /// Attach the session range and volume.
    pub fn with_range(
        mut self,
        high: Option<Decimal>,
        low: Option<Decimal>,
        volume: Option<Decimal>,
    ) -> Self {
        self.high = high;
        self.low = low;
        self.volume = volume;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sample_new() {
        let sample = QuoteSample::new(Utc::now(), dec!(150.25), "ALPHA_VANTAGE");
        assert_eq!(sample.price, dec!(150.25));
        assert_eq!(sample.source, "ALPHA_VANTAGE");
        assert!(sample.daily_change_pct.is_none());
        assert!(sample.weekly_change_pct.is_none());
    }

    #[test]
    fn test_sample_with_range() {
        let sample = QuoteSample::new(Utc::now(), dec!(150.25), "ALPHA_VANTAGE").with_range(
            Some(dec!(152.00)),
            Some(dec!(147.50)),
            Some(dec!(1000000)),
        );
        assert_eq!(sample.high, Some(dec!(152.00)));
        assert_eq!(sample.low, Some(dec!(147.50)));
        assert_eq!(sample.volume, Some(dec!(1000000)));
    }

    #[test]
    fn test_sample_serialization_skips_missing_metrics() {
        let sample = QuoteSample::new(Utc::now(), dec!(1), "COINGECKO");
        let json = serde_json::to_value(&sample).unwrap();
        assert!(json.get("weekly_change_pct").is_none());
        assert!(json.get("price").is_some());
    }
}

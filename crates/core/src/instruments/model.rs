//! Instrument domain model.

use chrono::{DateTime, Utc};
use marketsync_market_data::QuoteSample;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two disjoint asset classes the engine tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetClass {
    Equity,
    Crypto,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "EQUITY",
            AssetClass::Crypto => "CRYPTO",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EQUITY" => Ok(AssetClass::Equity),
            "CRYPTO" => Ok(AssetClass::Crypto),
            other => Err(format!("Unknown asset class: {}", other)),
        }
    }
}

/// Latest market snapshot for one symbol.
///
/// `symbol` is the natural key. A record is created on the first successful
/// fetch and only ever mutated in place afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub display_name: String,
    pub current_price: Decimal,
    pub daily_change_pct: Option<Decimal>,
    pub weekly_change_pct: Option<Decimal>,
    pub daily_high: Option<Decimal>,
    pub daily_low: Option<Decimal>,
    pub volume: Option<Decimal>,
    /// When the snapshot was taken upstream, not when it was written.
    pub last_updated: DateTime<Utc>,
}

impl Instrument {
    /// Build a brand new record from its first sample.
    pub fn from_sample(
        symbol: impl Into<String>,
        asset_class: AssetClass,
        display_name: impl Into<String>,
        sample: &QuoteSample,
    ) -> Self {
        let mut instrument = Self {
            symbol: symbol.into(),
            asset_class,
            display_name: display_name.into(),
            current_price: sample.price,
            daily_change_pct: None,
            weekly_change_pct: None,
            daily_high: None,
            daily_low: None,
            volume: None,
            last_updated: sample.timestamp,
        };
        instrument.apply_sample(sample);
        instrument
    }

    /// Fold a sample into this record.
    ///
    /// Price and timestamp always move. Every optional metric is overwritten
    /// only when the sample carries it, so a metric that could not be fetched
    /// or derived this cycle keeps its last known value.
    pub fn apply_sample(&mut self, sample: &QuoteSample) {
        self.current_price = sample.price;
        self.last_updated = sample.timestamp;

        merge(&mut self.daily_change_pct, sample.daily_change_pct);
        merge(&mut self.weekly_change_pct, sample.weekly_change_pct);
        merge(&mut self.daily_high, sample.high);
        merge(&mut self.daily_low, sample.low);
        merge(&mut self.volume, sample.volume);
    }
}

fn merge(target: &mut Option<Decimal>, fresh: Option<Decimal>) {
    if fresh.is_some() {
        *target = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample_at(hour: u32, price: Decimal) -> QuoteSample {
        QuoteSample::new(
            Utc.with_ymd_and_hms(2024, 1, 5, hour, 0, 0).unwrap(),
            price,
            "ALPHA_VANTAGE",
        )
    }

    #[test]
    fn test_from_sample_copies_metrics() {
        let mut sample = sample_at(10, dec!(150.00)).with_range(
            Some(dec!(152)),
            Some(dec!(147)),
            Some(dec!(1000)),
        );
        sample.daily_change_pct = Some(dec!(50.0000));

        let instrument = Instrument::from_sample("AAPL", AssetClass::Equity, "Apple Inc.", &sample);

        assert_eq!(instrument.symbol, "AAPL");
        assert_eq!(instrument.asset_class, AssetClass::Equity);
        assert_eq!(instrument.display_name, "Apple Inc.");
        assert_eq!(instrument.current_price, dec!(150.00));
        assert_eq!(instrument.daily_change_pct, Some(dec!(50.0000)));
        assert_eq!(instrument.weekly_change_pct, None);
        assert_eq!(instrument.daily_high, Some(dec!(152)));
        assert_eq!(instrument.daily_low, Some(dec!(147)));
        assert_eq!(instrument.volume, Some(dec!(1000)));
        assert_eq!(instrument.last_updated, sample.timestamp);
    }

    #[test]
    fn test_apply_sample_keeps_metrics_missing_from_sample() {
        let mut first = sample_at(10, dec!(100));
        first.daily_change_pct = Some(dec!(1.0000));
        first.weekly_change_pct = Some(dec!(5.0000));
        let mut instrument = Instrument::from_sample("MSFT", AssetClass::Equity, "Microsoft", &first);

        let mut second = sample_at(11, dec!(101));
        second.daily_change_pct = Some(dec!(2.0000));
        instrument.apply_sample(&second);

        assert_eq!(instrument.current_price, dec!(101));
        assert_eq!(instrument.daily_change_pct, Some(dec!(2.0000)));
        assert_eq!(instrument.weekly_change_pct, Some(dec!(5.0000)));
        assert_eq!(instrument.last_updated, second.timestamp);
    }

    #[test]
    fn test_apply_sample_is_idempotent() {
        let mut sample = sample_at(10, dec!(43250.12));
        sample.daily_change_pct = Some(dec!(2.3457));
        sample.weekly_change_pct = Some(dec!(-1.2346));

        let mut once = Instrument::from_sample("BTC", AssetClass::Crypto, "Bitcoin", &sample);
        let mut twice = once.clone();
        once.apply_sample(&sample);
        twice.apply_sample(&sample);
        twice.apply_sample(&sample);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_asset_class_wire_format() {
        assert_eq!(
            serde_json::to_string(&AssetClass::Equity).unwrap(),
            "\"EQUITY\""
        );
        assert_eq!("CRYPTO".parse::<AssetClass>().unwrap(), AssetClass::Crypto);
        assert!("STOCK".parse::<AssetClass>().is_err());
    }

    #[test]
    fn test_instrument_serializes_camel_case() {
        let sample = sample_at(10, dec!(1));
        let instrument = Instrument::from_sample("DOGE", AssetClass::Crypto, "Dogecoin", &sample);
        let json = serde_json::to_value(&instrument).unwrap();
        assert!(json.get("displayName").is_some());
        assert!(json.get("lastUpdated").is_some());
        assert_eq!(json["assetClass"], "CRYPTO");
    }
}

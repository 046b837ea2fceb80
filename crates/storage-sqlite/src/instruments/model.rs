//! Database model for instruments.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use marketsync_core::instruments::{AssetClass, Instrument};

use crate::errors::StorageError;

/// Row in the `instruments` table.
///
/// Decimals and timestamps are stored as text so values round-trip exactly.
#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(primary_key(symbol))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentDB {
    pub symbol: String,
    pub asset_class: String,
    pub display_name: String,
    pub current_price: String,
    pub daily_change_pct: Option<String>,
    pub weekly_change_pct: Option<String>,
    pub daily_high: Option<String>,
    pub daily_low: Option<String>,
    pub volume: Option<String>,
    pub last_updated: String,
}

fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(raw).map_err(|e| {
        StorageError::SerializationError(format!("invalid {} '{}': {}", column, raw, e))
    })
}

fn parse_optional(column: &str, raw: Option<String>) -> Result<Option<Decimal>, StorageError> {
    raw.map(|s| parse_decimal(column, &s)).transpose()
}

impl From<&Instrument> for InstrumentDB {
    fn from(instrument: &Instrument) -> Self {
        InstrumentDB {
            symbol: instrument.symbol.clone(),
            asset_class: instrument.asset_class.as_str().to_string(),
            display_name: instrument.display_name.clone(),
            current_price: instrument.current_price.to_string(),
            daily_change_pct: instrument.daily_change_pct.map(|d| d.to_string()),
            weekly_change_pct: instrument.weekly_change_pct.map(|d| d.to_string()),
            daily_high: instrument.daily_high.map(|d| d.to_string()),
            daily_low: instrument.daily_low.map(|d| d.to_string()),
            volume: instrument.volume.map(|d| d.to_string()),
            last_updated: instrument.last_updated.to_rfc3339(),
        }
    }
}

impl TryFrom<InstrumentDB> for Instrument {
    type Error = StorageError;

    fn try_from(db: InstrumentDB) -> Result<Self, Self::Error> {
        let asset_class =
            AssetClass::from_str(&db.asset_class).map_err(StorageError::SerializationError)?;
        let last_updated = DateTime::parse_from_rfc3339(&db.last_updated)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                StorageError::SerializationError(format!(
                    "invalid last_updated '{}': {}",
                    db.last_updated, e
                ))
            })?;

        Ok(Instrument {
            current_price: parse_decimal("current_price", &db.current_price)?,
            daily_change_pct: parse_optional("daily_change_pct", db.daily_change_pct)?,
            weekly_change_pct: parse_optional("weekly_change_pct", db.weekly_change_pct)?,
            daily_high: parse_optional("daily_high", db.daily_high)?,
            daily_low: parse_optional("daily_low", db.daily_low)?,
            volume: parse_optional("volume", db.volume)?,
            symbol: db.symbol,
            asset_class,
            display_name: db.display_name,
            last_updated,
        })
    }
}

//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that every adapter implements
//! - Provider capabilities
//! - The Alpha Vantage (equities) and CoinGecko (crypto) adapters

mod capabilities;
mod traits;

pub mod alpha_vantage;
pub mod coingecko;

#[cfg(test)]
pub(crate) mod test_server;

pub use capabilities::ProviderCapabilities;
pub use traits::QuoteProvider;

use rust_decimal::Decimal;
use std::str::FromStr;

/// Maximum number of characters of a response body quoted in log messages.
const LOG_SNIPPET_CHARS: usize = 100;

/// Shorten a response body for logging.
pub(crate) fn snippet(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(LOG_SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Parse a decimal from either plain (`"150.25"`) or scientific (`"1.5e3"`) notation.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_short_body_unchanged() {
        assert_eq!(snippet("{}"), "{}");
    }

    #[test]
    fn test_snippet_truncates_long_body() {
        let body = "x".repeat(250);
        let shortened = snippet(&body);
        assert_eq!(shortened.len(), 103);
        assert!(shortened.ends_with("..."));
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let body = "é".repeat(150);
        let shortened = snippet(&body);
        assert_eq!(shortened.chars().count(), 103);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("150.25").unwrap().to_string(), "150.25");
        assert_eq!(parse_decimal(" 42 ").unwrap().to_string(), "42");
        assert_eq!(parse_decimal("1.5e3").unwrap(), Decimal::from(1500));
        assert!(parse_decimal("invalid").is_none());
        assert!(parse_decimal("").is_none());
    }
}

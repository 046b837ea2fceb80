//! The fixed set of instruments the engine refreshes.
//!
//! Equities are queried by their ticker verbatim. Coins are queried by their
//! CoinGecko id and stored under their ticker.

use super::model::AssetClass;

/// One tracked instrument and how to ask its provider for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseEntry {
    /// Canonical symbol the record is stored under.
    pub symbol: &'static str,
    /// Identifier the provider expects.
    pub provider_symbol: &'static str,
    pub display_name: &'static str,
    pub asset_class: AssetClass,
}

impl UniverseEntry {
    pub const fn equity(symbol: &'static str, display_name: &'static str) -> Self {
        Self {
            symbol,
            provider_symbol: symbol,
            display_name,
            asset_class: AssetClass::Equity,
        }
    }

    pub const fn crypto(
        coin_id: &'static str,
        ticker: &'static str,
        display_name: &'static str,
    ) -> Self {
        Self {
            symbol: ticker,
            provider_symbol: coin_id,
            display_name,
            asset_class: AssetClass::Crypto,
        }
    }

    /// Display name for a new record, falling back to the symbol.
    pub fn name(&self) -> &'static str {
        if self.display_name.trim().is_empty() {
            self.symbol
        } else {
            self.display_name
        }
    }
}

pub const EQUITY_UNIVERSE: &[UniverseEntry] = &[
    UniverseEntry::equity("AAPL", "Apple Inc."),
    UniverseEntry::equity("MSFT", "Microsoft Corporation"),
    UniverseEntry::equity("GOOGL", "Alphabet Inc."),
    UniverseEntry::equity("AMZN", "Amazon.com, Inc."),
    UniverseEntry::equity("TSLA", "Tesla, Inc."),
    UniverseEntry::equity("META", "Meta Platforms, Inc."),
    UniverseEntry::equity("NVDA", "NVIDIA Corporation"),
    UniverseEntry::equity("JPM", "JPMorgan Chase & Co."),
    UniverseEntry::equity("V", "Visa Inc."),
    UniverseEntry::equity("WMT", "Walmart Inc."),
];

pub const CRYPTO_UNIVERSE: &[UniverseEntry] = &[
    UniverseEntry::crypto("bitcoin", "BTC", "Bitcoin"),
    UniverseEntry::crypto("ethereum", "ETH", "Ethereum"),
    UniverseEntry::crypto("binancecoin", "BNB", "Binance Coin"),
    UniverseEntry::crypto("ripple", "XRP", "XRP"),
    UniverseEntry::crypto("cardano", "ADA", "Cardano"),
    UniverseEntry::crypto("solana", "SOL", "Solana"),
    UniverseEntry::crypto("dogecoin", "DOGE", "Dogecoin"),
    UniverseEntry::crypto("polkadot", "DOT", "Polkadot"),
    UniverseEntry::crypto("avalanche-2", "AVAX", "Avalanche"),
    UniverseEntry::crypto("matic-network", "MATIC", "Polygon"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_universe_sizes() {
        assert_eq!(EQUITY_UNIVERSE.len(), 10);
        assert_eq!(CRYPTO_UNIVERSE.len(), 10);
    }

    #[test]
    fn test_symbols_are_unique_across_classes() {
        let symbols: HashSet<_> = EQUITY_UNIVERSE
            .iter()
            .chain(CRYPTO_UNIVERSE.iter())
            .map(|e| e.symbol)
            .collect();
        assert_eq!(symbols.len(), 20);
    }

    #[test]
    fn test_crypto_entries_map_coin_id_to_ticker() {
        let eth = &CRYPTO_UNIVERSE[1];
        assert_eq!(eth.symbol, "ETH");
        assert_eq!(eth.provider_symbol, "ethereum");
        assert_eq!(eth.asset_class, AssetClass::Crypto);

        let avax = &CRYPTO_UNIVERSE[8];
        assert_eq!(avax.symbol, "AVAX");
        assert_eq!(avax.provider_symbol, "avalanche-2");
    }

    #[test]
    fn test_equity_entries_use_symbol_verbatim() {
        for entry in EQUITY_UNIVERSE {
            assert_eq!(entry.symbol, entry.provider_symbol);
            assert_eq!(entry.asset_class, AssetClass::Equity);
        }
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(EQUITY_UNIVERSE[7].name(), "JPMorgan Chase & Co.");
        assert_eq!(CRYPTO_UNIVERSE[9].name(), "Polygon");
        assert_eq!(UniverseEntry::equity("IBM", "").name(), "IBM");
        assert_eq!(UniverseEntry::crypto("tether", "USDT", " ").name(), "USDT");
    }
}

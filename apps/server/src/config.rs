use std::time::Duration;

use anyhow::bail;
use marketsync_core::refresh::RefreshConfig;
use tracing::warn;

const DEFAULT_DB_PATH: &str = "./db/marketsync.db";

pub struct Config {
    pub api_key: String,
    pub db_path: String,
    pub refresh: RefreshConfig,
}

impl Config {
    /// Read settings from the process environment.
    ///
    /// `.env` is expected to be loaded by the caller.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_key = lookup("MS_ALPHA_VANTAGE_API_KEY")
            .map(|k| k.trim().to_string())
            .unwrap_or_default();
        if api_key.is_empty() {
            bail!("MS_ALPHA_VANTAGE_API_KEY must be set");
        }

        let db_path = lookup("MS_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into());

        let defaults = RefreshConfig::default();
        let millis = |key: &str, default: Duration| -> Duration {
            match lookup(key) {
                None => default,
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(ms) => Duration::from_millis(ms),
                    Err(_) => {
                        warn!(
                            "Invalid {}={:?}, using default of {} ms",
                            key,
                            raw,
                            default.as_millis()
                        );
                        default
                    }
                },
            }
        };

        let quota = match lookup("MS_QUOTA") {
            None => defaults.quota,
            Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                warn!("Invalid MS_QUOTA={:?}, using default of {}", raw, defaults.quota);
                defaults.quota
            }),
        };

        let refresh = RefreshConfig {
            quota,
            quota_window: millis("MS_QUOTA_WINDOW_MS", defaults.quota_window),
            equity_call_delay: millis("MS_RATE_LIMIT_MS", defaults.equity_call_delay),
            crypto_call_delay: millis("MS_CRYPTO_DELAY_MS", defaults.crypto_call_delay),
            refresh_interval: millis("MS_REFRESH_INTERVAL_MS", defaults.refresh_interval),
            initial_delay: millis("MS_INITIAL_DELAY_MS", defaults.initial_delay),
            http_timeout: millis("MS_HTTP_TIMEOUT_MS", defaults.http_timeout),
        };

        Ok(Self {
            api_key,
            db_path,
            refresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_api_key() {
        let config = config_from(&[("MS_ALPHA_VANTAGE_API_KEY", "demo")]).unwrap();
        assert_eq!(config.api_key, "demo");
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.refresh, RefreshConfig::default());
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("MS_ALPHA_VANTAGE_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("MS_ALPHA_VANTAGE_API_KEY", "key"),
            ("MS_DB_PATH", "/tmp/ms.db"),
            ("MS_QUOTA", "75"),
            ("MS_QUOTA_WINDOW_MS", "30000"),
            ("MS_RATE_LIMIT_MS", "800"),
            ("MS_CRYPTO_DELAY_MS", "2000"),
            ("MS_REFRESH_INTERVAL_MS", "60000"),
            ("MS_INITIAL_DELAY_MS", "0"),
            ("MS_HTTP_TIMEOUT_MS", "5000"),
        ])
        .unwrap();

        assert_eq!(config.db_path, "/tmp/ms.db");
        assert_eq!(config.refresh.quota, 75);
        assert_eq!(config.refresh.quota_window, Duration::from_secs(30));
        assert_eq!(config.refresh.equity_call_delay, Duration::from_millis(800));
        assert_eq!(config.refresh.crypto_call_delay, Duration::from_secs(2));
        assert_eq!(config.refresh.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.refresh.initial_delay, Duration::ZERO);
        assert_eq!(config.refresh.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        let config = config_from(&[
            ("MS_ALPHA_VANTAGE_API_KEY", "key"),
            ("MS_QUOTA", "five"),
            ("MS_REFRESH_INTERVAL_MS", "-1"),
        ])
        .unwrap();

        assert_eq!(config.refresh.quota, 5);
        assert_eq!(config.refresh.refresh_interval, Duration::from_secs(300));
    }
}

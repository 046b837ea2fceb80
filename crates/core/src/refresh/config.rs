//! Refresh cycle configuration.

use marketsync_market_data::RateGovernorConfig;
use std::time::Duration;

use crate::errors::{Error, Result};

/// Calls allowed per quota window on the equity provider.
pub const DEFAULT_QUOTA: u32 = 5;
pub const DEFAULT_QUOTA_WINDOW: Duration = Duration::from_millis(60_000);
/// Spacing between equity symbols; 12s keeps five symbols inside one minute.
pub const DEFAULT_EQUITY_CALL_DELAY: Duration = Duration::from_millis(12_000);
pub const DEFAULT_CRYPTO_CALL_DELAY: Duration = Duration::from_millis(1_500);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(300_000);
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1_000);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing and budget settings for the refresh engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    pub quota: u32,
    pub quota_window: Duration,
    pub equity_call_delay: Duration,
    pub crypto_call_delay: Duration,
    pub refresh_interval: Duration,
    pub initial_delay: Duration,
    pub http_timeout: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            quota: DEFAULT_QUOTA,
            quota_window: DEFAULT_QUOTA_WINDOW,
            equity_call_delay: DEFAULT_EQUITY_CALL_DELAY,
            crypto_call_delay: DEFAULT_CRYPTO_CALL_DELAY,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            initial_delay: DEFAULT_INITIAL_DELAY,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl RefreshConfig {
    /// Budget settings for the equity provider's governor.
    pub fn governor_config(&self) -> RateGovernorConfig {
        RateGovernorConfig {
            quota: self.quota,
            window: self.quota_window,
        }
    }

    /// Reject settings the scheduler or HTTP client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval.is_zero() {
            return Err(Error::InvalidConfigValue(
                "refresh interval must be greater than zero".to_string(),
            ));
        }
        if self.quota_window.is_zero() {
            return Err(Error::InvalidConfigValue(
                "quota window must be greater than zero".to_string(),
            ));
        }
        if self.http_timeout.is_zero() {
            return Err(Error::InvalidConfigValue(
                "HTTP timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RefreshConfig::default();
        assert_eq!(config.quota, 5);
        assert_eq!(config.quota_window, Duration::from_secs(60));
        assert_eq!(config.equity_call_delay, Duration::from_secs(12));
        assert_eq!(config.crypto_call_delay, Duration::from_millis(1500));
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_governor_config_follows_quota() {
        let config = RefreshConfig {
            quota: 75,
            ..Default::default()
        };
        let governor = config.governor_config();
        assert_eq!(governor.quota, 75);
        assert_eq!(governor.window, Duration::from_secs(60));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = RefreshConfig {
            refresh_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfigValue(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = RefreshConfig {
            quota_window: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_quota_is_allowed() {
        let config = RefreshConfig {
            quota: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}

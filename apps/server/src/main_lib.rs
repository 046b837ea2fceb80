use std::sync::Arc;

use marketsync_core::refresh::MarketDataService;
use marketsync_market_data::{AlphaVantageProvider, CoinGeckoProvider};
use marketsync_storage_sqlite::{db, InstrumentRepository};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub market_data_service: Arc<MarketDataService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("MS_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    config.refresh.validate()?;

    db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);
    let pool = db::create_pool(&config.db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());
    let store = Arc::new(InstrumentRepository::new(pool, writer));

    let timeout = config.refresh.http_timeout;
    let equity_provider = Arc::new(AlphaVantageProvider::with_timeout(
        config.api_key.clone(),
        timeout,
    ));
    let crypto_provider = Arc::new(CoinGeckoProvider::with_timeout(timeout));

    let market_data_service = Arc::new(MarketDataService::new(
        config.refresh.clone(),
        store,
        equity_provider,
        crypto_provider,
    ));

    Ok(Arc::new(AppState {
        market_data_service,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketsync_core::refresh::{RefreshConfig, RefreshState};
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_build_state_creates_database() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("marketsync.db");
        let config = Config {
            api_key: "test".to_string(),
            db_path: db_path.to_string_lossy().to_string(),
            refresh: RefreshConfig::default(),
        };

        let state = build_state(&config).await.unwrap();

        assert!(db_path.exists());
        let service = &state.market_data_service;
        assert_eq!(service.refresh_state(), RefreshState::Idle);
        assert!(service.get_all_instruments().unwrap().is_empty());
        assert_eq!(service.governor().quota(), 5);
    }

    #[tokio::test]
    async fn test_build_state_rejects_zero_interval() {
        let temp_dir = tempdir().unwrap();
        let config = Config {
            api_key: "test".to_string(),
            db_path: temp_dir.path().join("m.db").to_string_lossy().to_string(),
            refresh: RefreshConfig {
                refresh_interval: Duration::ZERO,
                ..Default::default()
            },
        };

        assert!(build_state(&config).await.is_err());
    }
}

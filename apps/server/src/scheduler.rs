//! Background scheduler for periodic market data refresh.
//!
//! Ticks at a fixed rate after an initial delay. Each tick spawns its own
//! cycle; the service's busy guard drops a tick that lands while the
//! previous cycle is still running.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use marketsync_core::refresh::{MarketDataService, RefreshOutcome};

use crate::main_lib::AppState;

/// Starts the background refresh scheduler.
pub fn start_refresh_scheduler(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let config = state.market_data_service.config().clone();
        info!(
            "Market data refresh scheduler started ({:?} interval)",
            config.refresh_interval
        );

        tokio::time::sleep(config.initial_delay).await;

        // First tick is immediate
        let mut refresh_interval = interval(config.refresh_interval);
        refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            refresh_interval.tick().await;
            let service = state.market_data_service.clone();
            tokio::spawn(async move {
                run_scheduled_refresh(&service).await;
            });
        }
    })
}

/// Runs a single scheduled refresh cycle.
async fn run_scheduled_refresh(service: &MarketDataService) {
    match service.refresh_market_data().await {
        RefreshOutcome::Completed(report) => {
            debug!(
                "Scheduled refresh completed in {:?}",
                report.elapsed
            );
        }
        RefreshOutcome::SkippedBusy => {
            debug!("Scheduled refresh skipped: previous cycle still running");
        }
        RefreshOutcome::Aborted => {
            warn!("Scheduled refresh aborted; retrying on the next tick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use marketsync_core::instruments::{Instrument, InstrumentStore, UniverseEntry};
    use marketsync_core::refresh::RefreshConfig;
    use marketsync_market_data::{
        MarketDataError, ProviderCapabilities, QuoteProvider, QuoteSample,
    };
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        fn id(&self) -> &'static str {
            "COUNTING"
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities {
                quota_constrained: false,
                includes_weekly_change: true,
            }
        }

        async fn fetch_quote(&self, _symbol: &str) -> Result<QuoteSample, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(QuoteSample::new(Utc::now(), dec!(1), "COUNTING"))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<Instrument>>,
    }

    #[async_trait]
    impl InstrumentStore for MemoryStore {
        async fn upsert(&self, instrument: Instrument) -> marketsync_core::Result<Instrument> {
            let mut rows = self.rows.lock().unwrap();
            rows.retain(|i| i.symbol != instrument.symbol);
            rows.push(instrument.clone());
            Ok(instrument)
        }

        fn find_by_symbol(&self, symbol: &str) -> marketsync_core::Result<Option<Instrument>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|i| i.symbol == symbol)
                .cloned())
        }

        fn find_all(&self) -> marketsync_core::Result<Vec<Instrument>> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_waits_then_ticks_at_fixed_rate() {
        let provider = Arc::new(CountingProvider::default());
        let config = RefreshConfig {
            initial_delay: Duration::from_secs(1),
            refresh_interval: Duration::from_secs(300),
            equity_call_delay: Duration::ZERO,
            crypto_call_delay: Duration::ZERO,
            ..Default::default()
        };
        let service = MarketDataService::new(
            config,
            Arc::new(MemoryStore::default()),
            provider.clone(),
            provider.clone(),
        )
        .with_universe(vec![UniverseEntry::equity("AAPL", "Apple Inc.")], vec![]);
        let state = Arc::new(AppState {
            market_data_service: Arc::new(service),
        });

        let handle = start_refresh_scheduler(state.clone());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

        let stored = state.market_data_service.get_all_instruments().unwrap();
        assert_eq!(stored.len(), 1);

        handle.abort();
    }
}

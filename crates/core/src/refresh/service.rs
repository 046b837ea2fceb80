//! Market data refresh service.
//!
//! # Architecture
//!
//! ```text
//! MarketDataService
//!       │
//!       ├─► RateGovernor (call budget for the quota-constrained provider)
//!       ├─► QuoteProvider (equities, then crypto)
//!       └─► InstrumentStore (find + merge + upsert per symbol)
//! ```
//!
//! A cycle walks the equity universe and then the crypto universe, one
//! symbol at a time. Failures are isolated per symbol, store failures
//! included; only a provider backing off (or the budget running dry) ends a
//! phase early, and nothing short of a panic ends the cycle.

use futures::FutureExt;
use log::{debug, error, info, warn};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use marketsync_market_data::{FailureScope, QuoteProvider, QuoteSample, RateGovernor};

use super::config::RefreshConfig;
use crate::errors::Result;
use crate::instruments::{
    Instrument, InstrumentStore, UniverseEntry, CRYPTO_UNIVERSE, EQUITY_UNIVERSE,
};

const STATE_IDLE: u8 = 0;
const STATE_EQUITY: u8 = 1;
const STATE_CRYPTO: u8 = 2;

/// The two legs of a refresh cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Equity,
    Crypto,
}

impl RefreshPhase {
    fn as_raw(self) -> u8 {
        match self {
            RefreshPhase::Equity => STATE_EQUITY,
            RefreshPhase::Crypto => STATE_CRYPTO,
        }
    }
}

impl fmt::Display for RefreshPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshPhase::Equity => f.write_str("equity"),
            RefreshPhase::Crypto => f.write_str("crypto"),
        }
    }
}

/// What the engine is doing right now. There is no failed state: every
/// cycle ends in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Running(RefreshPhase),
}

impl RefreshState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            STATE_EQUITY => RefreshState::Running(RefreshPhase::Equity),
            STATE_CRYPTO => RefreshState::Running(RefreshPhase::Crypto),
            _ => RefreshState::Idle,
        }
    }
}

/// Counts for one phase of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReport {
    /// Symbols a quote fetch was issued for.
    pub attempted: usize,
    /// Symbols whose record was written. A failed store write leaves a
    /// symbol attempted but not succeeded.
    pub succeeded: usize,
    /// The phase stopped early because the provider's budget ran out or the
    /// provider asked us to back off.
    pub quota_exhausted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub equity: PhaseReport,
    pub crypto: PhaseReport,
    pub elapsed: Duration,
}

/// Result of a call to [`MarketDataService::refresh_market_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cycle ran both phases.
    Completed(CycleReport),
    /// Another cycle was already running; this trigger was dropped.
    SkippedBusy,
    /// The cycle panicked and was abandoned.
    Aborted,
}

/// Holds the single-flight flag for the duration of a cycle and resets it
/// to idle on drop, including when the cycle unwinds.
struct CycleGuard<'a> {
    state: &'a AtomicU8,
}

impl<'a> CycleGuard<'a> {
    fn try_begin(state: &'a AtomicU8) -> Option<Self> {
        state
            .compare_exchange(STATE_IDLE, STATE_EQUITY, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { state })
    }

    fn enter(&self, phase: RefreshPhase) {
        self.state.store(phase.as_raw(), Ordering::Release);
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.state.store(STATE_IDLE, Ordering::Release);
    }
}

/// Orchestrates refresh cycles and serves the stored snapshots.
pub struct MarketDataService {
    store: Arc<dyn InstrumentStore>,
    equity_provider: Arc<dyn QuoteProvider>,
    crypto_provider: Arc<dyn QuoteProvider>,
    governor: RateGovernor,
    config: RefreshConfig,
    equities: Vec<UniverseEntry>,
    cryptos: Vec<UniverseEntry>,
    state: AtomicU8,
}

impl MarketDataService {
    pub fn new(
        config: RefreshConfig,
        store: Arc<dyn InstrumentStore>,
        equity_provider: Arc<dyn QuoteProvider>,
        crypto_provider: Arc<dyn QuoteProvider>,
    ) -> Self {
        let governor = RateGovernor::new(config.governor_config());
        Self {
            store,
            equity_provider,
            crypto_provider,
            governor,
            config,
            equities: EQUITY_UNIVERSE.to_vec(),
            cryptos: CRYPTO_UNIVERSE.to_vec(),
            state: AtomicU8::new(STATE_IDLE),
        }
    }

    /// Replace the equity provider's governor, e.g. one driven by a manual clock.
    pub fn with_governor(mut self, governor: RateGovernor) -> Self {
        self.governor = governor;
        self
    }

    /// Refresh a different set of instruments than the built-in tables.
    pub fn with_universe(mut self, equities: Vec<UniverseEntry>, cryptos: Vec<UniverseEntry>) -> Self {
        self.equities = equities;
        self.cryptos = cryptos;
        self
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    pub fn get_all_instruments(&self) -> Result<Vec<Instrument>> {
        self.store.find_all()
    }

    pub fn get_instrument_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>> {
        self.store.find_by_symbol(symbol)
    }

    pub fn refresh_state(&self) -> RefreshState {
        RefreshState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Run one refresh cycle unless one is already in flight.
    ///
    /// Never returns an error: per-symbol failures, store failures included,
    /// are logged and skipped, and a panic abandons the cycle. In every case the
    /// engine is idle again when this returns.
    pub async fn refresh_market_data(&self) -> RefreshOutcome {
        let Some(guard) = CycleGuard::try_begin(&self.state) else {
            info!("Market data refresh already in progress, skipping this trigger");
            return RefreshOutcome::SkippedBusy;
        };

        info!("Starting market data refresh");

        let outcome = match AssertUnwindSafe(self.run_cycle(&guard))
            .catch_unwind()
            .await
        {
            Ok(report) => {
                info!(
                    "Market data refresh completed in {:?}: equities {}/{} updated, crypto {}/{} updated",
                    report.elapsed,
                    report.equity.succeeded,
                    report.equity.attempted,
                    report.crypto.succeeded,
                    report.crypto.attempted
                );
                RefreshOutcome::Completed(report)
            }
            Err(panic) => {
                error!(
                    "Market data refresh aborted by panic: {}",
                    panic_message(panic.as_ref())
                );
                RefreshOutcome::Aborted
            }
        };

        drop(guard);
        outcome
    }

    async fn run_cycle(&self, guard: &CycleGuard<'_>) -> CycleReport {
        let started = Instant::now();

        let equity = self
            .run_phase(
                RefreshPhase::Equity,
                self.equity_provider.as_ref(),
                &self.equities,
                self.config.equity_call_delay,
            )
            .await;
        info!(
            "Equity refresh finished: {}/{} updated{}",
            equity.succeeded,
            equity.attempted,
            if equity.quota_exhausted {
                " (stopped early: rate limit)"
            } else {
                ""
            }
        );

        guard.enter(RefreshPhase::Crypto);
        let crypto = self
            .run_phase(
                RefreshPhase::Crypto,
                self.crypto_provider.as_ref(),
                &self.cryptos,
                self.config.crypto_call_delay,
            )
            .await;
        info!(
            "Crypto refresh finished: {}/{} updated",
            crypto.succeeded, crypto.attempted
        );

        CycleReport {
            equity,
            crypto,
            elapsed: started.elapsed(),
        }
    }

    /// Walk one universe in order against one provider.
    ///
    /// Quota-constrained providers spend one governor call per request and a
    /// `RateLimited` signal from them ends the phase. For other providers it
    /// only skips the symbol.
    async fn run_phase(
        &self,
        phase: RefreshPhase,
        provider: &dyn QuoteProvider,
        entries: &[UniverseEntry],
        call_delay: Duration,
    ) -> PhaseReport {
        let caps = provider.capabilities();
        let mut report = PhaseReport::default();

        for (index, entry) in entries.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(call_delay).await;
            }

            if caps.quota_constrained && !self.governor.try_acquire() {
                warn!(
                    "{} call budget exhausted ({} per window), skipping remaining {} symbols from {}",
                    provider.id(),
                    self.governor.quota(),
                    phase,
                    entry.symbol
                );
                report.quota_exhausted = true;
                break;
            }

            report.attempted += 1;
            let mut sample = match provider.fetch_quote(entry.provider_symbol).await {
                Ok(sample) => sample,
                Err(e) if caps.quota_constrained && e.scope() == FailureScope::Provider => {
                    warn!(
                        "{} rate limited at {}, aborting {} phase: {}",
                        provider.id(),
                        entry.symbol,
                        phase,
                        e
                    );
                    report.quota_exhausted = true;
                    break;
                }
                Err(e) => {
                    warn!(
                        "Skipping {} ({}) this cycle: {}",
                        entry.symbol, entry.provider_symbol, e
                    );
                    continue;
                }
            };

            let mut backed_off = false;
            if !caps.includes_weekly_change {
                if caps.quota_constrained && !self.governor.try_acquire() {
                    debug!(
                        "Call budget exhausted, keeping previous weekly change for {}",
                        entry.symbol
                    );
                } else {
                    match provider.fetch_weekly_change(entry.provider_symbol).await {
                        Ok(change) => sample.weekly_change_pct = Some(change),
                        Err(e) if caps.quota_constrained && e.scope() == FailureScope::Provider => {
                            warn!(
                                "{} rate limited during weekly fetch for {}: {}",
                                provider.id(),
                                entry.symbol,
                                e
                            );
                            backed_off = true;
                        }
                        Err(e) => {
                            warn!("Weekly change unavailable for {}: {}", entry.symbol, e);
                        }
                    }
                }
            }

            match self.apply_sample(entry, &sample).await {
                Ok(_) => report.succeeded += 1,
                Err(e) => error!("Failed to save {} this cycle: {}", entry.symbol, e),
            }

            if backed_off {
                report.quota_exhausted = true;
                break;
            }
        }

        report
    }

    /// Merge a sample into the stored record (or create one) and write it back.
    async fn apply_sample(&self, entry: &UniverseEntry, sample: &QuoteSample) -> Result<Instrument> {
        let instrument = match self.store.find_by_symbol(entry.symbol)? {
            Some(mut existing) => {
                existing.apply_sample(sample);
                existing
            }
            None => {
                debug!("Creating new instrument record for {}", entry.symbol);
                Instrument::from_sample(entry.symbol, entry.asset_class, entry.name(), sample)
            }
        };

        let saved = self.store.upsert(instrument).await?;
        info!(
            "Updated {} {}: price={} daily={} weekly={}",
            saved.asset_class,
            saved.symbol,
            saved.current_price,
            display_pct(saved.daily_change_pct),
            display_pct(saved.weekly_change_pct)
        );
        Ok(saved)
    }
}

fn display_pct(value: Option<rust_decimal::Decimal>) -> String {
    value
        .map(|v| format!("{}%", v))
        .unwrap_or_else(|| "n/a".to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

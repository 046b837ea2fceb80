//! Fixed-window call budget for a quota-constrained provider.
//!
//! The governor never waits. A caller asks for permission with
//! [`RateGovernor::try_acquire`] and, if refused, abandons the work for the
//! rest of the window instead of sleeping until budget frees up.
//!
//! The window start and the call count are packed into a single `AtomicU64`
//! so that rolling the window, checking the budget and counting the call all
//! happen in one compare-and-swap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

/// Alpha Vantage free tier: 5 calls per minute.
const DEFAULT_QUOTA: u32 = 5;

/// Default window length.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Bits reserved for the call counter in the packed state.
const COUNT_BITS: u32 = 16;
const COUNT_MASK: u64 = (1 << COUNT_BITS) - 1;
const START_MASK: u64 = (1 << (64 - COUNT_BITS)) - 1;

/// Source of "now" for the governor, in milliseconds since an arbitrary origin.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Wall-clock time measured from the moment the clock was created.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to. Used to simulate window expiry.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Budget configuration for one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateGovernorConfig {
    /// Calls allowed per window.
    pub quota: u32,
    /// Length of the window.
    pub window: Duration,
}

impl Default for RateGovernorConfig {
    fn default() -> Self {
        Self {
            quota: DEFAULT_QUOTA,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Call budget for a single quota-constrained provider.
///
/// The window is rolled lazily: the first `try_acquire` after
/// `window_start + window` has passed starts a new window at the current
/// time and counts itself as its first call.
pub struct RateGovernor {
    quota: u32,
    window_ms: u64,
    clock: Arc<dyn Clock>,
    /// `window_start << COUNT_BITS | calls_used`
    state: AtomicU64,
}

fn pack(window_start: u64, calls_used: u32) -> u64 {
    ((window_start & START_MASK) << COUNT_BITS) | (calls_used as u64 & COUNT_MASK)
}

fn unpack(state: u64) -> (u64, u32) {
    (state >> COUNT_BITS, (state & COUNT_MASK) as u32)
}

impl RateGovernor {
    /// Create a governor backed by the wall clock.
    pub fn new(config: RateGovernorConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Create a governor with an explicit clock.
    pub fn with_clock(config: RateGovernorConfig, clock: Arc<dyn Clock>) -> Self {
        let quota = config.quota.min(COUNT_MASK as u32);
        let window_start = clock.now_millis();
        Self {
            quota,
            window_ms: config.window.as_millis() as u64,
            clock,
            state: AtomicU64::new(pack(window_start, 0)),
        }
    }

    /// Calls allowed per window.
    pub fn quota(&self) -> u32 {
        self.quota
    }

    /// Try to spend one call from the current window's budget.
    ///
    /// Returns true if the call may go ahead, false if the budget is exhausted
    /// until the window rolls over.
    pub fn try_acquire(&self) -> bool {
        if self.quota == 0 {
            return false;
        }

        let now = self.clock.now_millis();
        let window_ms = self.window_ms;
        let quota = self.quota;

        let outcome = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |packed| {
                let (start, used) = unpack(packed);
                if now > start.saturating_add(window_ms) {
                    Some(pack(now, 1))
                } else if used < quota {
                    Some(pack(start, used + 1))
                } else {
                    None
                }
            });

        match outcome {
            Ok(previous) => {
                let (start, used) = unpack(previous);
                if now > start.saturating_add(window_ms) {
                    debug!(
                        "Rate governor: window rolled over, previous count {}",
                        used
                    );
                }
                true
            }
            Err(_) => {
                debug!("Rate governor: budget of {} calls exhausted", quota);
                false
            }
        }
    }

    /// Calls already spent in the current window.
    ///
    /// Reports zero once the window has expired, even before the next
    /// `try_acquire` rolls it.
    pub fn calls_used(&self) -> u32 {
        let (start, used) = unpack(self.state.load(Ordering::Acquire));
        if self.clock.now_millis() > start.saturating_add(self.window_ms) {
            0
        } else {
            used
        }
    }

    /// Calls still available in the current window.
    pub fn remaining(&self) -> u32 {
        self.quota.saturating_sub(self.calls_used())
    }
}

impl std::fmt::Debug for RateGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (start, used) = unpack(self.state.load(Ordering::Acquire));
        f.debug_struct("RateGovernor")
            .field("quota", &self.quota)
            .field("window_ms", &self.window_ms)
            .field("window_start", &start)
            .field("calls_used", &used)
            .finish()
    }
}

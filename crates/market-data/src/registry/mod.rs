//! Call budgeting for quota-constrained providers.

mod rate_governor;

pub use rate_governor::{Clock, ManualClock, MonotonicClock, RateGovernor, RateGovernorConfig};

//! Provider capabilities.
//!
//! Describes what a provider supplies directly and whether its calls must be
//! budgeted, so the orchestrator can sequence adapters without knowing which
//! concrete provider it is talking to.

/// Describes the capabilities of a quote provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderCapabilities {
    /// Calls are subject to a hard per-window quota and must pass through a
    /// rate governor. A `RateLimited` signal from such a provider abandons the
    /// rest of its phase for the cycle.
    pub quota_constrained: bool,

    /// The snapshot endpoint already includes the 7-day change.
    /// When false, the weekly change comes from a separate
    /// `fetch_weekly_change` call.
    pub includes_weekly_change: bool,
}

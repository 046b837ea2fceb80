/// How far a failed fetch reaches within a refresh cycle.
///
/// Used by the orchestrator to decide what to skip after an adapter call fails.
///
/// # Behavior Summary
///
/// | Scope | Current symbol | Remaining symbols of the provider | Other provider |
/// |-------|----------------|-----------------------------------|----------------|
/// | `Metric` | Other fields still commit | Continue | Continue |
/// | `Symbol` | Skipped | Continue | Continue |
/// | `Provider` | Skipped | Skipped for this cycle | Continue |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureScope {
    /// Only one derived metric is lost (e.g. a division by zero).
    /// The rest of the sample is still applied.
    Metric,

    /// The current symbol is skipped; the cycle moves on to the next one.
    Symbol,

    /// The provider signaled quota exhaustion.
    ///
    /// For a quota-constrained provider the rest of its phase is abandoned
    /// until the next cycle. Ungoverned providers downgrade this to `Symbol`.
    Provider,
}

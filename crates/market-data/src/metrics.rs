//! Derived metrics computed from paired price points.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::MarketDataError;

/// Fixed precision for every derived percentage.
pub const PCT_SCALE: u32 = 4;

/// Percentage change from `prior` to `current`.
///
/// Computed as `(current - prior) / prior * 100` and rounded half-up to
/// [`PCT_SCALE`] decimal places. The result always carries exactly four
/// fractional digits, so `150` against `100` renders as `50.0000`.
///
/// # Errors
///
/// Returns [`MarketDataError::Computation`] when `prior` is zero or the
/// arithmetic overflows.
///
/// # Examples
///
/// ```
/// use marketsync_market_data::metrics::pct_change;
/// use rust_decimal::Decimal;
///
/// let change = pct_change(Decimal::from(150), Decimal::from(100)).unwrap();
/// assert_eq!(change.to_string(), "50.0000");
/// ```
pub fn pct_change(current: Decimal, prior: Decimal) -> Result<Decimal, MarketDataError> {
    if prior.is_zero() {
        return Err(MarketDataError::Computation(format!(
            "cannot compute change from a zero prior value (current = {})",
            current
        )));
    }

    let mut change = current
        .checked_sub(prior)
        .and_then(|delta| delta.checked_div(prior))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| {
            MarketDataError::Computation(format!(
                "overflow computing change from {} to {}",
                prior, current
            ))
        })?
        .round_dp_with_strategy(PCT_SCALE, RoundingStrategy::MidpointAwayFromZero);

    change.rescale(PCT_SCALE);
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pct_change_gain() {
        let change = pct_change(dec!(150.00), dec!(100.00)).unwrap();
        assert_eq!(change, dec!(50.0000));
        assert_eq!(change.to_string(), "50.0000");
    }

    #[test]
    fn test_pct_change_loss() {
        let change = pct_change(dec!(90), dec!(120)).unwrap();
        assert_eq!(change.to_string(), "-25.0000");
    }

    #[test]
    fn test_pct_change_unchanged() {
        let change = pct_change(dec!(42.5), dec!(42.5)).unwrap();
        assert_eq!(change.to_string(), "0.0000");
    }

    #[test]
    fn test_pct_change_rounds_half_up() {
        // 1/3 * 100 = 33.3333...
        assert_eq!(pct_change(dec!(4), dec!(3)).unwrap(), dec!(33.3333));
        // 2/3 * 100 = 66.6666... rounds up
        assert_eq!(pct_change(dec!(5), dec!(3)).unwrap(), dec!(66.6667));
        assert_eq!(pct_change(dec!(1.000125), dec!(1)).unwrap(), dec!(0.0125));
        // 0.00015 and 0.00005 sit exactly on the midpoint
        assert_eq!(pct_change(dec!(1.0000015), dec!(1)).unwrap(), dec!(0.0002));
        assert_eq!(pct_change(dec!(1.0000005), dec!(1)).unwrap(), dec!(0.0001));
    }

    #[test]
    fn test_pct_change_negative_midpoint_rounds_away_from_zero() {
        assert_eq!(pct_change(dec!(0.9999995), dec!(1)).unwrap(), dec!(-0.0001));
    }

    #[test]
    fn test_pct_change_is_deterministic() {
        let first = pct_change(dec!(187.4412), dec!(181.0921)).unwrap();
        for _ in 0..10 {
            assert_eq!(pct_change(dec!(187.4412), dec!(181.0921)).unwrap(), first);
        }
        assert_eq!(first, dec!(3.5060));
    }

    #[test]
    fn test_pct_change_zero_prior_is_computation_error() {
        let err = pct_change(dec!(150), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, MarketDataError::Computation(_)));
    }

    #[test]
    fn test_pct_change_overflow_is_computation_error() {
        let err = pct_change(Decimal::MAX, dec!(-1)).unwrap_err();
        assert!(matches!(err, MarketDataError::Computation(_)));
    }
}

//! Equal-split allocation using the Largest Remainder Method.
//!
//! Splitting a cost N ways cannot be represented exactly in `Decimal`
//! (100 / 3 never terminates), so each share is cut at a fixed number of
//! decimal places and the leftover units are handed out one at a time:
//! 1. Round the total to the target precision
//! 2. Express it as an integer count of units (`10^-decimal_places`)
//! 3. Integer-divide by the recipient count: quotient is the base share,
//!    remainder is the number of leftover units
//! 4. Give one extra unit to the first recipients until the remainder is gone
//!
//! Integer division never rounds up, so the remainder is never negative.
//! When the total has too many digits to be expressed at the target
//! precision (a `Decimal` mantissa holds 96 bits), the precision is lowered
//! step by step, never below the total's own scale.

use rust_decimal::prelude::*;

/// Allocation utility for distributing amounts.
///
/// Guarantees that the sum of allocations EXACTLY equals the (rounded) total
/// and that no two allocations differ by more than one unit of the scale
/// actually used.
pub struct AllocationUtil;

impl AllocationUtil {
    /// Allocate `total` equally across `count` recipients.
    ///
    /// Negative totals are split by magnitude and the sign restored, so the
    /// first recipients always receive the larger magnitude.
    ///
    /// # Arguments
    ///
    /// * `total` - The total amount to allocate
    /// * `count` - Number of recipients
    /// * `decimal_places` - Number of decimal places for each allocation (at most 28)
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tabsplit_core::balance::AllocationUtil;
    ///
    /// // 100 / 3 = [33.34, 33.33, 33.33], sum = 100.00
    /// let result = AllocationUtil::allocate_equal(dec!(100), 3, 2);
    /// assert_eq!(result, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    /// assert_eq!(result.iter().sum::<rust_decimal::Decimal>(), dec!(100));
    /// ```
    #[must_use]
    pub fn allocate_equal(total: Decimal, count: usize, decimal_places: u32) -> Vec<Decimal> {
        if count == 0 {
            return vec![];
        }

        let negative = total < Decimal::ZERO;
        let magnitude = total.abs().round_dp_with_strategy(
            decimal_places.min(MAX_SCALE),
            RoundingStrategy::MidpointNearestEven,
        );

        let shares = if count == 1 {
            vec![magnitude]
        } else {
            Self::split_magnitude(magnitude, count, decimal_places.min(MAX_SCALE))
        };

        if negative {
            shares.into_iter().map(|share| -share).collect()
        } else {
            shares
        }
    }

    fn split_magnitude(magnitude: Decimal, count: usize, decimal_places: u32) -> Vec<Decimal> {
        // At the magnitude's own scale the units are its mantissa, which
        // always fits, so the search below cannot come up empty.
        (magnitude.scale()..=decimal_places)
            .rev()
            .find_map(|scale| Self::split_units(magnitude, count, scale))
            .unwrap_or_else(|| {
                let mut shares = vec![Decimal::ZERO; count];
                shares[0] = magnitude;
                shares
            })
    }

    /// Splits `magnitude` as whole units of `10^-scale`, or `None` when the
    /// units or a share do not fit a `Decimal`.
    fn split_units(magnitude: Decimal, count: usize, scale: u32) -> Option<Vec<Decimal>> {
        let factor = 10i128.checked_pow(scale.checked_sub(magnitude.scale())?)?;
        let units = magnitude.mantissa().checked_mul(factor)?;
        let divisor = i128::try_from(count).ok()?;

        let base_units = units / divisor;
        let extra_count = usize::try_from(units % divisor).ok()?;

        let base = Decimal::try_from_i128_with_scale(base_units, scale).ok()?;
        let bumped = if extra_count > 0 {
            Decimal::try_from_i128_with_scale(base_units + 1, scale).ok()?
        } else {
            base
        };

        Some(
            (0..count)
                .map(|i| if i < extra_count { bumped } else { base })
                .collect(),
        )
    }
}

/// Largest scale a `Decimal` can hold.
const MAX_SCALE: u32 = 28;

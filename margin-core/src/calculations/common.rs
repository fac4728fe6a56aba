//! Common utility functions for pricing calculations.
//!
//! Rounding, display formatting and overflow-checked arithmetic shared by
//! the solver phases.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::calculations::solver::SolveError;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use margin_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(33.334)), dec!(33.33));
/// assert_eq!(round_half_up(dec!(33.335)), dec!(33.34));
/// assert_eq!(round_half_up(dec!(-0.125)), dec!(-0.13)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a value for display with exactly two decimal places.
///
/// Values that round to zero are shown without a sign.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use margin_core::calculations::common::format_two_places;
///
/// assert_eq!(format_two_places(dec!(150)), "150.00");
/// assert_eq!(format_two_places(dec!(33.3333333)), "33.33");
/// assert_eq!(format_two_places(dec!(-0.001)), "0.00");
/// ```
pub fn format_two_places(value: Decimal) -> String {
    let rounded = round_half_up(value);
    if rounded.is_zero() {
        return "0.00".to_string();
    }
    format!("{:.2}", rounded)
}

/// Converts a percentage (0–100) into a fraction (0–1).
pub fn percent_to_fraction(percent: Decimal) -> Result<Decimal, SolveError> {
    div(percent, Decimal::ONE_HUNDRED)
}

/// Converts a fraction (0–1) into a percentage (0–100).
pub fn fraction_to_percent(fraction: Decimal) -> Result<Decimal, SolveError> {
    mul(fraction, Decimal::ONE_HUNDRED)
}

pub fn add(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, SolveError> {
    a.checked_add(b).ok_or(SolveError::Overflow)
}

pub fn sub(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, SolveError> {
    a.checked_sub(b).ok_or(SolveError::Overflow)
}

pub fn mul(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, SolveError> {
    a.checked_mul(b).ok_or(SolveError::Overflow)
}

/// Checked division. Callers test for zero divisors themselves so they can
/// report which rule hit it; a zero divisor reaching here is reported as
/// an overflow.
pub fn div(
    a: Decimal,
    b: Decimal,
) -> Result<Decimal, SolveError> {
    a.checked_div(b).ok_or(SolveError::Overflow)
}

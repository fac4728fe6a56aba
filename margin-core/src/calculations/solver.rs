//! Equation solver for the margin calculator form.
//!
//! The form links six quantities with two pricing equations:
//!
//! | Equation | Meaning |
//! |----------|---------|
//! | `net2 = (net1 + added_value) × (1 − discount)` | Final price after added value and discount |
//! | `cost = net2 × (1 − target_margin)` | Cost implied by a target margin on Net2 |
//!
//! The operator fills in some fields and leaves others empty. The solver
//! works through these phases:
//!
//! 1. Parse the display text into typed values and range-check them.
//! 2. Decide whether a Net2 on the form is a real input or a placeholder
//!    the target margin should replace.
//! 3. Seed zero defaults for added value and discount when nothing could
//!    derive them.
//! 4. Apply the resolution rules in rounds until a round changes nothing,
//!    then check the price equation. A zero that was only assumed and
//!    contradicts it is withdrawn and solved in further rounds; a
//!    contradiction between typed values is rejected. All rounds share one
//!    cap.
//! 5. Write the solved values back, keeping operator-typed values.
//! 6. Compute the margin without discount and the margin with discount.
//!
//! Domain violations are never panics: [`PricingSolver::resolve`] returns a
//! [`SolveError`], and [`PricingSolver::solve`] turns it into the status
//! message of the returned snapshot.
//!
//! # Example
//!
//! ```
//! use margin_core::{FieldName, FormSnapshot, solve};
//!
//! let mut form = FormSnapshot::empty();
//! form.set_user(FieldName::Cost, "100");
//! form.set_user(FieldName::Net1, "150");
//!
//! let result = solve(&form);
//!
//! assert_eq!(result.status(), "");
//! assert_eq!(result.value(FieldName::Net2), "150.00");
//! assert_eq!(result.value(FieldName::MarginNoDiscount), "33.33");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::calculations::common::{
    add, div, format_two_places, fraction_to_percent, mul, percent_to_fraction, sub,
};
use crate::calculations::parse::{opt_decimal_display, parse_optional_decimal};
use crate::{FieldName, FormSnapshot, Origin};

/// Upper bound on propagation rounds.
///
/// Every rule only fills in a missing quantity, so the rules settle within a
/// handful of rounds; the cap guards against rule interactions that were
/// never anticipated.
pub const MAX_PROPAGATION_ROUNDS: usize = 30;

/// Display value for a margin that cannot be computed from the inputs.
pub const MARGIN_SENTINEL: &str = "—";

/// Errors that can occur while solving the pricing form.
///
/// The `Display` text is the message shown to the operator in the status
/// field, so each variant names the field to clear or correct.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolveError {
    /// A field contains text that is not a number.
    #[error("{} is not a valid number: '{input}'.", .field.label())]
    InvalidNumber { field: FieldName, input: String },

    /// The operator entered a negative added value.
    #[error("Added Value cannot be negative.")]
    NegativeAddedValue,

    /// The discount percentage is outside 0–100.
    #[error("Discount must be between 0% and 100%.")]
    DiscountOutOfRange,

    /// The target margin percentage is outside 0–100.
    #[error("Target margin must be between 0% and 100%.")]
    MarginOutOfRange,

    /// Cost, a fixed Net2 and a target margin were all supplied.
    #[error("Too many inputs. Clear one of the fields to solve.")]
    TooManyInputs,

    /// Solving Net2 from cost with a 100% target margin.
    #[error("Target margin cannot be 100% when solving Net2.")]
    FullMarginForNet2,

    /// Solving the discount with Net1 + Added Value equal to zero.
    #[error("Net1 + Added Value cannot be 0 when solving discount.")]
    ZeroDiscountBase,

    /// The added value derived from the other fields is negative.
    #[error("Added Value cannot be negative with these inputs.")]
    NegativeSolvedAddedValue,

    /// The discount derived from the other fields is outside 0–100%.
    #[error("Solved discount is outside 0%..100%. Check inputs.")]
    SolvedDiscountOutOfRange,

    /// Solving Net1 from Net2 with a 100% discount.
    #[error("Discount cannot be 100% when solving Net1 from Net2.")]
    FullDiscountForNet1,

    /// Solving the added value with a 100% discount.
    #[error("Discount cannot be 100% when solving Added Value.")]
    FullDiscountForAddedValue,

    /// An intermediate value exceeded the decimal range.
    #[error("Values are too large to calculate.")]
    Overflow,

    /// The solver configuration is unusable.
    #[error("max rounds must be between 1 and {max}, got {0}", max = MAX_PROPAGATION_ROUNDS)]
    InvalidMaxRounds(usize),
}

/// Configuration parameters for the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum number of propagation rounds, at most [`MAX_PROPAGATION_ROUNDS`].
    pub max_rounds: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_rounds: MAX_PROPAGATION_ROUNDS,
        }
    }
}

impl SolverConfig {
    /// Validates the configuration values.
    ///
    /// # Example
    ///
    /// ```
    /// use margin_core::{SolveError, SolverConfig};
    ///
    /// let config = SolverConfig { max_rounds: 0 };
    ///
    /// assert_eq!(config.validate(), Err(SolveError::InvalidMaxRounds(0)));
    /// ```
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.max_rounds == 0 || self.max_rounds > MAX_PROPAGATION_ROUNDS {
            return Err(SolveError::InvalidMaxRounds(self.max_rounds));
        }
        Ok(())
    }
}

/// The six pricing quantities. `None` means unknown.
///
/// Discount and target margin are fractions in `[0, 1]`, not percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantities {
    pub cost: Option<Decimal>,
    pub net1: Option<Decimal>,
    pub added_value: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub net2: Option<Decimal>,
    pub margin: Option<Decimal>,
}

/// Result of a successful solve, before formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The solved quantities.
    pub quantities: Quantities,

    /// Margin without discount, in percent. `None` when not computable.
    pub margin_without_discount: Option<Decimal>,

    /// Margin with discount and added value, in percent. `None` when not computable.
    pub margin_with_discount: Option<Decimal>,

    /// Origin of Net2 after a placeholder Net2 was released to the solver.
    pub net2_origin: Origin,

    /// Whether the discount may be written back to the form.
    ///
    /// False when the discount was neither entered, assumed, nor solved.
    pub discount_writable: bool,

    /// The discount in percent when it may be written back.
    pub discount_percent: Option<Decimal>,

    /// Number of propagation rounds that ran.
    pub rounds: usize,
}

/// Bookkeeping carried through the phases alongside the quantities.
#[derive(Debug, Clone, Default)]
struct SolveState {
    q: Quantities,
    discount_supplied: bool,
    discount_assumed: bool,
    discount_solved: bool,
    added_value_assumed_zero: bool,
    added_value_from_user: bool,
    net2_origin: Origin,
}

/// Solver for the pricing form.
///
/// Holds only configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct PricingSolver {
    config: SolverConfig,
}

impl PricingSolver {
    /// Creates a solver after validating `config`.
    pub fn new(config: SolverConfig) -> Result<Self, SolveError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves the form and returns the replacement snapshot.
    ///
    /// On failure the returned snapshot keeps every input as it was, clears
    /// both margins and carries the error message in the status field.
    pub fn solve(
        &self,
        form: &FormSnapshot,
    ) -> FormSnapshot {
        match self.resolve(form) {
            Ok(resolution) => write_back(form, &resolution),
            Err(error) => {
                debug!(%error, "pricing form could not be solved");
                failure_snapshot(form, &error)
            }
        }
    }

    /// Solves the form and returns the typed quantities.
    pub fn resolve(
        &self,
        form: &FormSnapshot,
    ) -> Result<Resolution, SolveError> {
        let mut state = parse_inputs(form)?;
        resolve_net2_ambiguity(&mut state, form)?;
        seed_defaults(&mut state);
        let max_rounds = self.config.max_rounds;
        let mut rounds = propagate(&mut state, max_rounds)?;
        while retract_conflicting_assumption(&mut state)? {
            let remaining = max_rounds - rounds;
            if remaining == 0 {
                warn!(max_rounds, "round cap reached before a withdrawn assumption was solved");
                break;
            }
            rounds += propagate(&mut state, remaining)?;
        }

        if state.q.added_value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(SolveError::NegativeAddedValue);
        }

        let (margin_without_discount, margin_with_discount) = margins(&state.q)?;
        let discount_writable =
            state.discount_supplied || state.discount_assumed || state.discount_solved;
        let discount_percent = state
            .q
            .discount
            .filter(|_| discount_writable)
            .map(fraction_to_percent)
            .transpose()?;

        Ok(Resolution {
            quantities: state.q,
            margin_without_discount,
            margin_with_discount,
            net2_origin: state.net2_origin,
            discount_writable,
            discount_percent,
            rounds,
        })
    }
}

/// Solves the form with the default configuration.
pub fn solve(form: &FormSnapshot) -> FormSnapshot {
    PricingSolver::default().solve(form)
}

// ─── phase 1: parse ─────────────────────────────────────────────────────────

/// Values the solver wrote on an earlier run are derived, not given: they
/// are re-derived from the operator's inputs rather than parsed.
fn parse_inputs(form: &FormSnapshot) -> Result<SolveState, SolveError> {
    let parse = |field| match form.origin(field) {
        Origin::Calc => Ok(None),
        Origin::User | Origin::Unset => parse_optional_decimal(field, form.value(field)),
    };

    let cost = parse(FieldName::Cost)?;
    let net1 = parse(FieldName::Net1)?;
    let added_value = parse(FieldName::AddedValue)?;
    let discount_pct = parse(FieldName::Discount)?;
    let net2 = parse(FieldName::Net2)?;
    let margin_pct = parse(FieldName::TargetMargin)?;

    let discount = discount_pct.map(percent_to_fraction).transpose()?;
    let margin = margin_pct.map(percent_to_fraction).transpose()?;

    if added_value.is_some_and(|v| v < Decimal::ZERO) {
        return Err(SolveError::NegativeAddedValue);
    }
    if discount.is_some_and(|d| !in_unit_range(d)) {
        return Err(SolveError::DiscountOutOfRange);
    }
    if margin.is_some_and(|m| !in_unit_range(m)) {
        return Err(SolveError::MarginOutOfRange);
    }

    debug!(?cost, ?net1, ?added_value, ?discount, ?net2, ?margin, "parsed pricing inputs");

    Ok(SolveState {
        q: Quantities {
            cost,
            net1,
            added_value,
            discount,
            net2,
            margin,
        },
        discount_supplied: discount.is_some(),
        added_value_from_user: form.origin(FieldName::AddedValue).is_user(),
        net2_origin: form.origin(FieldName::Net2),
        ..Default::default()
    })
}

fn in_unit_range(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

// ─── phase 2: net2 vs target margin ─────────────────────────────────────────

/// A Net2 equal to Net1 alongside a target margin is a placeholder the
/// form mirrored from Net1; it is released so the margin can set Net2.
fn resolve_net2_ambiguity(
    state: &mut SolveState,
    form: &FormSnapshot,
) -> Result<(), SolveError> {
    let q = &mut state.q;
    if q.margin.is_none() {
        return Ok(());
    }

    if state.net2_origin.is_user()
        && form.origin(FieldName::Net1).is_user()
        && q.net1.is_some()
        && q.net2 == q.net1
    {
        debug!("net2 mirrors net1; releasing it to the target margin");
        state.net2_origin = Origin::Calc;
    }

    if !state.net2_origin.is_user() {
        q.net2 = None;
    }

    if q.cost.is_some() && q.net2.is_some() && state.net2_origin.is_user() {
        return Err(SolveError::TooManyInputs);
    }

    Ok(())
}

// ─── phase 3: default assumptions ───────────────────────────────────────────

fn seed_defaults(state: &mut SolveState) {
    let q = &mut state.q;

    match (q.added_value, q.discount) {
        (None, None) => {
            q.added_value = Some(Decimal::ZERO);
            state.added_value_assumed_zero = true;
            if q.net1.is_none() || q.net2.is_none() {
                q.discount = Some(Decimal::ZERO);
                state.discount_assumed = true;
            }
        }
        (None, Some(_)) => {
            if !(q.net1.is_some() && q.net2.is_some()) {
                q.added_value = Some(Decimal::ZERO);
                state.added_value_assumed_zero = true;
            }
        }
        (Some(_), None) => {
            let margin_path = q.margin.is_some() && q.cost.is_some();
            let triple_known = q.net1.is_some() && q.net2.is_some();
            if !margin_path && !triple_known {
                q.discount = Some(Decimal::ZERO);
                state.discount_assumed = true;
            }
        }
        (Some(_), Some(_)) => {}
    }

    debug!(
        added_value_assumed_zero = state.added_value_assumed_zero,
        discount_assumed = state.discount_assumed,
        "seeded default assumptions"
    );
}

// ─── phase 4: fixed-point propagation ───────────────────────────────────────

/// Applies the resolution rules until a round changes nothing, returning the
/// number of rounds that ran.
fn propagate(
    state: &mut SolveState,
    max_rounds: usize,
) -> Result<usize, SolveError> {
    for round in 1..=max_rounds {
        if !propagation_round(state)? {
            debug!(round, "propagation settled");
            return Ok(round);
        }
    }
    warn!(max_rounds, "propagation stopped at the round cap");
    Ok(max_rounds)
}

/// Runs every rule once, in priority order. Returns whether any rule fired.
fn propagation_round(state: &mut SolveState) -> Result<bool, SolveError> {
    let mut progress = false;

    // Late added-value fallback: both prices known, nothing to split them.
    {
        let q = &mut state.q;
        if q.added_value.is_none()
            && q.net1.is_some()
            && q.net2.is_some()
            && q.discount.is_none()
        {
            trace!("assuming zero added value");
            q.added_value = Some(Decimal::ZERO);
            state.added_value_assumed_zero = true;
            progress = true;
        }
    }

    if let Some(margin) = state.q.margin {
        let q = &mut state.q;
        if let (None, Some(cost)) = (q.net2, q.cost) {
            let keep = sub(Decimal::ONE, margin)?;
            if keep.is_zero() {
                return Err(SolveError::FullMarginForNet2);
            }
            q.net2 = Some(div(cost, keep)?);
            trace!(net2 = ?q.net2, "net2 from cost and target margin");
            progress = true;
        }
        if let (None, Some(net2)) = (q.cost, q.net2) {
            q.cost = Some(mul(net2, sub(Decimal::ONE, margin)?)?);
            trace!(cost = ?q.cost, "cost from net2 and target margin");
            progress = true;
        }
    }

    if let (None, Some(net1), Some(added_value), Some(net2)) =
        (state.q.discount, state.q.net1, state.q.added_value, state.q.net2)
    {
        solve_discount(state, net1, added_value, net2)?;
        progress = true;
    }

    let q = &mut state.q;

    if let (None, Some(net1), Some(added_value), Some(discount)) =
        (q.net2, q.net1, q.added_value, q.discount)
    {
        q.net2 = Some(mul(add(net1, added_value)?, sub(Decimal::ONE, discount)?)?);
        trace!(net2 = ?q.net2, "net2 from net1, added value and discount");
        progress = true;
    }

    if let (None, Some(net2), Some(added_value), Some(discount)) =
        (q.net1, q.net2, q.added_value, q.discount)
    {
        let keep = sub(Decimal::ONE, discount)?;
        if keep.is_zero() {
            return Err(SolveError::FullDiscountForNet1);
        }
        q.net1 = Some(sub(div(net2, keep)?, added_value)?);
        trace!(net1 = ?q.net1, "net1 from net2, added value and discount");
        progress = true;
    }

    if let (None, Some(net2), Some(net1), Some(discount)) =
        (q.added_value, q.net2, q.net1, q.discount)
    {
        let keep = sub(Decimal::ONE, discount)?;
        if keep.is_zero() {
            return Err(SolveError::FullDiscountForAddedValue);
        }
        let candidate = sub(div(net2, keep)?, net1)?;
        if candidate < Decimal::ZERO {
            return Err(SolveError::NegativeSolvedAddedValue);
        }
        q.added_value = Some(candidate);
        trace!(added_value = ?q.added_value, "added value from prices and discount");
        progress = true;
    }

    // Late discount fallback: two of the three price terms are known and the
    // margin cannot pin anything down, so a zero discount unblocks the rest.
    let margin_path = q.margin.is_some() && q.cost.is_some();
    if q.discount.is_none() && !state.discount_supplied && !margin_path {
        let known = [q.net1, q.net2, q.added_value]
            .iter()
            .filter(|v| v.is_some())
            .count();
        if known == 2 {
            trace!("assuming zero discount");
            q.discount = Some(Decimal::ZERO);
            state.discount_assumed = true;
            progress = true;
        }
    }

    Ok(progress)
}

/// Solves the discount from both prices and the added value.
///
/// A negative discount with an assumed (not typed) zero added value means
/// the price rise is added value instead: the discount becomes zero and the
/// added value absorbs the difference.
fn solve_discount(
    state: &mut SolveState,
    net1: Decimal,
    added_value: Decimal,
    net2: Decimal,
) -> Result<(), SolveError> {
    let base = add(net1, added_value)?;
    if base.is_zero() {
        return Err(SolveError::ZeroDiscountBase);
    }
    let candidate = sub(Decimal::ONE, div(net2, base)?)?;

    if candidate < Decimal::ZERO
        && state.added_value_assumed_zero
        && !state.added_value_from_user
    {
        let absorbed = sub(net2, net1)?;
        if absorbed < Decimal::ZERO {
            return Err(SolveError::NegativeSolvedAddedValue);
        }
        trace!(added_value = %absorbed, "price rise absorbed as added value");
        state.q.discount = Some(Decimal::ZERO);
        state.q.added_value = Some(absorbed);
    } else {
        if !in_unit_range(candidate) {
            return Err(SolveError::SolvedDiscountOutOfRange);
        }
        trace!(discount = %candidate, "discount from prices");
        state.q.discount = Some(candidate);
    }
    state.discount_solved = true;
    Ok(())
}

/// Relative gap below which the price equation counts as satisfied.
const EQUATION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Checks `net2 = (net1 + added_value) × (1 − discount)` once all four terms
/// are known. A zero that was only assumed and contradicts the others is
/// withdrawn so the next propagation solves it instead; with nothing left
/// to withdraw the inputs over-determine the form. Returns whether anything
/// was withdrawn.
fn retract_conflicting_assumption(state: &mut SolveState) -> Result<bool, SolveError> {
    let q = &mut state.q;
    let (Some(net1), Some(added_value), Some(discount), Some(net2)) =
        (q.net1, q.added_value, q.discount, q.net2)
    else {
        return Ok(false);
    };

    let expected = mul(add(net1, added_value)?, sub(Decimal::ONE, discount)?)?;
    let gap = sub(expected, net2)?.abs();
    if gap <= mul(EQUATION_TOLERANCE, net2.abs().max(Decimal::ONE))? {
        return Ok(false);
    }

    if state.discount_assumed {
        debug!(%gap, "price equation contradicts the assumed discount; solving it instead");
        q.discount = None;
        state.discount_assumed = false;
        Ok(true)
    } else if state.added_value_assumed_zero && !state.added_value_from_user {
        debug!(%gap, "price equation contradicts the assumed added value; solving it instead");
        q.added_value = None;
        state.added_value_assumed_zero = false;
        Ok(true)
    } else {
        Err(SolveError::TooManyInputs)
    }
}

// ─── phase 5: write back ────────────────────────────────────────────────────

/// Formats a successful resolution into the replacement snapshot.
fn write_back(
    form: &FormSnapshot,
    resolution: &Resolution,
) -> FormSnapshot {
    let mut out = form.clone();
    out.set_origin(FieldName::Net2, resolution.net2_origin);

    let q = &resolution.quantities;
    let solved = [
        (FieldName::Cost, q.cost),
        (FieldName::Net1, q.net1),
        (FieldName::AddedValue, q.added_value),
        (FieldName::Discount, resolution.discount_percent),
        (FieldName::Net2, q.net2),
    ];
    for (field, value) in solved {
        let Some(value) = value else {
            // A value written on an earlier run that nothing re-derived is stale.
            if out.origin(field) == Origin::Calc {
                out.set_value(field, "");
                out.set_origin(field, Origin::Unset);
            }
            continue;
        };
        let text = format_two_places(value);
        if out.origin(field).is_user() {
            out.set_value(field, text);
        } else {
            out.set_calc(field, text);
        }
    }

    out.set_calc(
        FieldName::MarginNoDiscount,
        opt_decimal_display(&resolution.margin_without_discount),
    );
    out.set_calc(
        FieldName::MarginWithDiscount,
        opt_decimal_display(&resolution.margin_with_discount),
    );
    out.set_calc(FieldName::Status, "");
    out
}

/// The snapshot returned when solving fails: inputs untouched, margins
/// cleared, the message in the status field.
fn failure_snapshot(
    form: &FormSnapshot,
    error: &SolveError,
) -> FormSnapshot {
    let mut out = form.clone();
    out.set_calc(FieldName::MarginNoDiscount, "");
    out.set_calc(FieldName::MarginWithDiscount, "");
    out.set_calc(FieldName::Status, error.to_string());
    out
}

// ─── phase 6: margins ───────────────────────────────────────────────────────

/// Profit margin of `price` over `cost` in percent, or `None` when either is
/// unknown or the price is zero.
fn margin_percent(
    price: Option<Decimal>,
    cost: Option<Decimal>,
) -> Result<Option<Decimal>, SolveError> {
    match (price, cost) {
        (Some(price), Some(cost)) if !price.is_zero() => {
            let fraction = div(sub(price, cost)?, price)?;
            fraction_to_percent(fraction).map(Some)
        }
        _ => Ok(None),
    }
}

fn margins(q: &Quantities) -> Result<(Option<Decimal>, Option<Decimal>), SolveError> {
    Ok((margin_percent(q.net1, q.cost)?, margin_percent(q.net2, q.cost)?))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn form(inputs: &[(FieldName, &str)]) -> FormSnapshot {
        let mut form = FormSnapshot::empty();
        for (field, text) in inputs {
            form.set_user(*field, *text);
        }
        form
    }

    fn resolve(inputs: &[(FieldName, &str)]) -> Result<Resolution, SolveError> {
        PricingSolver::default().resolve(&form(inputs))
    }

    // =========================================================================
    // SolverConfig tests
    // =========================================================================

    #[test]
    fn default_config_uses_round_cap() {
        assert_eq!(SolverConfig::default().max_rounds, MAX_PROPAGATION_ROUNDS);
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn config_rejects_rounds_above_cap() {
        let result = PricingSolver::new(SolverConfig { max_rounds: 31 });

        assert_eq!(result.unwrap_err(), SolveError::InvalidMaxRounds(31));
    }

    // =========================================================================
    // phase 1 tests
    // =========================================================================

    #[test]
    fn parse_converts_percentages_to_fractions() {
        let state = parse_inputs(&form(&[
            (FieldName::Discount, "25"),
            (FieldName::TargetMargin, "12,5"),
        ]))
        .unwrap();

        assert_eq!(state.q.discount, Some(dec!(0.25)));
        assert_eq!(state.q.margin, Some(dec!(0.125)));
        assert!(state.discount_supplied);
    }

    #[test]
    fn parse_ignores_values_from_earlier_runs() {
        let mut input = form(&[(FieldName::Net1, "100")]);
        input.set_calc(FieldName::Net2, "100");
        input.set_calc(FieldName::Discount, "0.00");

        let state = parse_inputs(&input).unwrap();

        assert_eq!(state.q.net2, None);
        assert_eq!(state.q.discount, None);
        assert!(!state.discount_supplied);
    }

    #[test]
    fn unset_values_are_still_inputs() {
        let mut input = FormSnapshot::empty();
        input.set_value(FieldName::Cost, "100");

        let state = parse_inputs(&input).unwrap();

        assert_eq!(state.q.cost, Some(dec!(100)));
    }

    #[test]
    fn parse_rejects_negative_added_value() {
        let result = resolve(&[(FieldName::AddedValue, "-1")]);

        assert_eq!(result.unwrap_err(), SolveError::NegativeAddedValue);
    }

    #[test]
    fn parse_rejects_discount_above_hundred() {
        let result = resolve(&[(FieldName::Discount, "100.01")]);

        assert_eq!(result.unwrap_err(), SolveError::DiscountOutOfRange);
    }

    #[test]
    fn parse_rejects_negative_margin() {
        let result = resolve(&[(FieldName::TargetMargin, "-5")]);

        assert_eq!(result.unwrap_err(), SolveError::MarginOutOfRange);
    }

    #[test]
    fn parse_reports_invalid_text() {
        let result = resolve(&[(FieldName::Net1, "12x")]);

        assert_eq!(
            result.unwrap_err().to_string(),
            "Net1 is not a valid number: '12x'."
        );
    }

    // =========================================================================
    // phase 2 tests
    // =========================================================================

    #[test]
    fn mirrored_net2_is_released_to_margin() {
        let resolution = resolve(&[
            (FieldName::Cost, "80"),
            (FieldName::Net1, "90"),
            (FieldName::Net2, "90"),
            (FieldName::TargetMargin, "20"),
        ])
        .unwrap();

        assert_eq!(resolution.net2_origin, Origin::Calc);
        assert_eq!(resolution.quantities.net2, Some(dec!(100)));
    }

    #[test]
    fn calc_net2_is_discarded_when_margin_given() {
        let mut input = form(&[(FieldName::Cost, "80"), (FieldName::TargetMargin, "20")]);
        input.set_calc(FieldName::Net2, "55.00");

        let resolution = PricingSolver::default().resolve(&input).unwrap();

        assert_eq!(resolution.quantities.net2, Some(dec!(100)));
    }

    #[test]
    fn cost_net2_and_margin_together_are_too_many() {
        let result = resolve(&[
            (FieldName::Cost, "80"),
            (FieldName::Net1, "90"),
            (FieldName::Net2, "110"),
            (FieldName::TargetMargin, "20"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::TooManyInputs);
    }

    #[test]
    fn user_net2_with_margin_solves_cost() {
        let resolution = resolve(&[(FieldName::Net2, "200"), (FieldName::TargetMargin, "25")])
            .unwrap();

        assert_eq!(resolution.quantities.cost, Some(dec!(150)));
    }

    // =========================================================================
    // phase 3 tests
    // =========================================================================

    #[test]
    fn seeds_both_zero_when_one_price_known() {
        let mut state = parse_inputs(&form(&[(FieldName::Net1, "150")])).unwrap();

        seed_defaults(&mut state);

        assert_eq!(state.q.added_value, Some(Decimal::ZERO));
        assert_eq!(state.q.discount, Some(Decimal::ZERO));
        assert!(state.discount_assumed);
    }

    #[test]
    fn leaves_discount_to_solver_when_both_prices_known() {
        let mut state =
            parse_inputs(&form(&[(FieldName::Net1, "100"), (FieldName::Net2, "90")])).unwrap();

        seed_defaults(&mut state);

        assert_eq!(state.q.added_value, Some(Decimal::ZERO));
        assert_eq!(state.q.discount, None);
    }

    #[test]
    fn leaves_added_value_to_solver_when_prices_and_discount_known() {
        let mut state = parse_inputs(&form(&[
            (FieldName::Net1, "100"),
            (FieldName::Net2, "99"),
            (FieldName::Discount, "10"),
        ]))
        .unwrap();

        seed_defaults(&mut state);

        assert_eq!(state.q.added_value, None);
    }

    #[test]
    fn leaves_discount_to_margin_path() {
        let mut state = parse_inputs(&form(&[
            (FieldName::Cost, "80"),
            (FieldName::AddedValue, "5"),
            (FieldName::TargetMargin, "20"),
        ]))
        .unwrap();

        seed_defaults(&mut state);

        assert_eq!(state.q.discount, None);
        assert!(!state.discount_assumed);
    }

    // =========================================================================
    // phase 4 tests
    // =========================================================================

    #[test]
    fn solves_discount_from_prices() {
        let resolution = resolve(&[(FieldName::Net1, "100"), (FieldName::Net2, "90")]).unwrap();

        assert_eq!(resolution.quantities.discount, Some(dec!(0.1)));
        assert!(resolution.discount_writable);
        assert_eq!(resolution.discount_percent, Some(dec!(10)));
    }

    #[test]
    fn price_rise_becomes_added_value() {
        let resolution = resolve(&[(FieldName::Net1, "100"), (FieldName::Net2, "110")]).unwrap();

        assert_eq!(resolution.quantities.discount, Some(Decimal::ZERO));
        assert_eq!(resolution.quantities.added_value, Some(dec!(10)));
    }

    #[test]
    fn price_rise_with_typed_added_value_is_rejected() {
        let result = resolve(&[
            (FieldName::Net1, "100"),
            (FieldName::AddedValue, "0"),
            (FieldName::Net2, "110"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::SolvedDiscountOutOfRange);
    }

    #[test]
    fn zero_discount_base_is_rejected() {
        let result = resolve(&[
            (FieldName::Net1, "0"),
            (FieldName::AddedValue, "0"),
            (FieldName::Net2, "10"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::ZeroDiscountBase);
    }

    #[test]
    fn solves_net1_from_net2() {
        let resolution = resolve(&[
            (FieldName::Net2, "90"),
            (FieldName::AddedValue, "10"),
            (FieldName::Discount, "10"),
        ])
        .unwrap();

        assert_eq!(resolution.quantities.net1, Some(dec!(90)));
    }

    #[test]
    fn full_discount_blocks_net1() {
        let result = resolve(&[
            (FieldName::Net2, "0"),
            (FieldName::AddedValue, "10"),
            (FieldName::Discount, "100"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::FullDiscountForNet1);
    }

    #[test]
    fn solves_added_value_from_prices_and_discount() {
        let resolution = resolve(&[
            (FieldName::Net1, "100"),
            (FieldName::Net2, "99"),
            (FieldName::Discount, "10"),
        ])
        .unwrap();

        assert_eq!(resolution.quantities.added_value, Some(dec!(10)));
    }

    #[test]
    fn negative_solved_added_value_is_rejected() {
        let result = resolve(&[
            (FieldName::Net1, "100"),
            (FieldName::Net2, "80"),
            (FieldName::Discount, "10"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::NegativeSolvedAddedValue);
    }

    #[test]
    fn full_discount_blocks_added_value() {
        let result = resolve(&[
            (FieldName::Net1, "100"),
            (FieldName::Net2, "0"),
            (FieldName::Discount, "100"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::FullDiscountForAddedValue);
    }

    #[test]
    fn full_margin_blocks_net2() {
        let result = resolve(&[(FieldName::Cost, "80"), (FieldName::TargetMargin, "100")]);

        assert_eq!(result.unwrap_err(), SolveError::FullMarginForNet2);
    }

    #[test]
    fn margin_path_solves_discount_through_net2() {
        let resolution = resolve(&[
            (FieldName::Cost, "72"),
            (FieldName::Net1, "100"),
            (FieldName::AddedValue, "0"),
            (FieldName::TargetMargin, "20"),
        ])
        .unwrap();

        assert_eq!(resolution.quantities.net2, Some(dec!(90)));
        assert_eq!(resolution.quantities.discount, Some(dec!(0.1)));
    }

    #[test]
    fn assumed_zero_discount_solves_net1() {
        let resolution = resolve(&[(FieldName::Net2, "120"), (FieldName::AddedValue, "20")])
            .unwrap();

        assert_eq!(resolution.quantities.discount, Some(Decimal::ZERO));
        assert_eq!(resolution.quantities.net1, Some(dec!(100)));
    }

    #[test]
    fn round_cap_stops_propagation() {
        let solver = PricingSolver::new(SolverConfig { max_rounds: 1 }).unwrap();
        let resolution = solver
            .resolve(&form(&[(FieldName::Cost, "100"), (FieldName::Net1, "150")]))
            .unwrap();

        assert_eq!(resolution.rounds, 1);
    }

    #[test]
    fn withdrawn_assumption_shares_the_round_cap() {
        let solver = PricingSolver::new(SolverConfig { max_rounds: 1 }).unwrap();
        let resolution = solver
            .resolve(&form(&[
                (FieldName::Cost, "80"),
                (FieldName::Net1, "125"),
                (FieldName::TargetMargin, "20"),
            ]))
            .unwrap();

        assert_eq!(resolution.rounds, 1);
        assert_eq!(resolution.quantities.net2, Some(dec!(100)));
        assert_eq!(resolution.quantities.discount, None);
        assert_eq!(resolution.discount_percent, None);
    }

    #[test]
    fn rounds_never_exceed_the_cap() {
        for max_rounds in 1..=3 {
            let solver = PricingSolver::new(SolverConfig { max_rounds }).unwrap();
            let resolution = solver
                .resolve(&form(&[
                    (FieldName::Cost, "80"),
                    (FieldName::Net1, "90"),
                    (FieldName::TargetMargin, "20"),
                ]))
                .unwrap();

            assert!(resolution.rounds <= max_rounds, "{max_rounds}: {}", resolution.rounds);
        }
    }

    #[test]
    fn overflow_is_reported() {
        let result = resolve(&[
            (FieldName::Net1, "79228162514264337593543950335"),
            (FieldName::AddedValue, "79228162514264337593543950335"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::Overflow);
    }

    // =========================================================================
    // assumption retraction tests
    // =========================================================================

    #[test]
    fn margin_net2_above_net1_becomes_added_value() {
        let resolution = resolve(&[
            (FieldName::Cost, "80"),
            (FieldName::Net1, "90"),
            (FieldName::TargetMargin, "20"),
        ])
        .unwrap();

        assert_eq!(resolution.quantities.net2, Some(dec!(100)));
        assert_eq!(resolution.quantities.discount, Some(Decimal::ZERO));
        assert_eq!(resolution.quantities.added_value, Some(dec!(10)));
    }

    #[test]
    fn margin_net2_below_net1_becomes_discount() {
        let resolution = resolve(&[
            (FieldName::Cost, "80"),
            (FieldName::Net1, "125"),
            (FieldName::TargetMargin, "20"),
        ])
        .unwrap();

        assert_eq!(resolution.quantities.net2, Some(dec!(100)));
        assert_eq!(resolution.quantities.discount, Some(dec!(0.2)));
        assert_eq!(resolution.quantities.added_value, Some(Decimal::ZERO));
    }

    #[test]
    fn margin_with_typed_discount_solves_added_value() {
        let resolution = resolve(&[
            (FieldName::Cost, "80"),
            (FieldName::Net1, "90"),
            (FieldName::Discount, "0"),
            (FieldName::TargetMargin, "20"),
        ])
        .unwrap();

        assert_eq!(resolution.quantities.added_value, Some(dec!(10)));
    }

    #[test]
    fn margin_against_fully_typed_prices_is_too_many() {
        let result = resolve(&[
            (FieldName::Cost, "80"),
            (FieldName::Net1, "90"),
            (FieldName::AddedValue, "0"),
            (FieldName::Discount, "0"),
            (FieldName::TargetMargin, "20"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::TooManyInputs);
    }

    #[test]
    fn margin_a_fraction_off_typed_prices_is_too_many() {
        let result = resolve(&[
            (FieldName::Cost, "80"),
            (FieldName::Net1, "100"),
            (FieldName::AddedValue, "0"),
            (FieldName::Discount, "0"),
            (FieldName::TargetMargin, "20.001"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::TooManyInputs);
    }

    #[test]
    fn typed_prices_that_disagree_are_too_many() {
        let result = resolve(&[
            (FieldName::Net1, "100"),
            (FieldName::AddedValue, "0"),
            (FieldName::Discount, "10"),
            (FieldName::Net2, "100"),
        ]);

        assert_eq!(result.unwrap_err(), SolveError::TooManyInputs);
    }

    #[test]
    fn typed_prices_that_agree_are_accepted() {
        let resolution = resolve(&[
            (FieldName::Net1, "100"),
            (FieldName::AddedValue, "10"),
            (FieldName::Discount, "10"),
            (FieldName::Net2, "99"),
        ])
        .unwrap();

        assert_eq!(resolution.discount_percent, Some(dec!(10)));
    }

    // =========================================================================
    // phase 5 and 6 tests
    // =========================================================================

    #[test]
    fn user_values_are_reformatted_not_recomputed() {
        let out = solve(&form(&[(FieldName::Cost, "100"), (FieldName::Net1, "150,5")]));

        assert_eq!(out.value(FieldName::Net1), "150.50");
        assert_eq!(out.origin(FieldName::Net1), Origin::User);
        assert_eq!(out.origin(FieldName::Net2), Origin::Calc);
    }

    #[test]
    fn discount_is_not_materialized_from_nothing() {
        let out = solve(&form(&[
            (FieldName::Cost, "80"),
            (FieldName::AddedValue, "0"),
            (FieldName::TargetMargin, "20"),
        ]));

        assert_eq!(out.value(FieldName::Net2), "100.00");
        assert_eq!(out.value(FieldName::Discount), "");
        assert_eq!(out.origin(FieldName::Discount), Origin::Unset);
    }

    #[test]
    fn margins_use_sentinel_without_cost() {
        let out = solve(&form(&[(FieldName::Net1, "150")]));

        assert_eq!(out.value(FieldName::MarginNoDiscount), MARGIN_SENTINEL);
        assert_eq!(out.value(FieldName::MarginWithDiscount), MARGIN_SENTINEL);
        assert_eq!(out.status(), "");
    }

    #[test]
    fn earlier_results_are_recomputed_from_new_inputs() {
        let mut input = form(&[
            (FieldName::Net1, "100"),
            (FieldName::AddedValue, "10"),
            (FieldName::Discount, "25"),
        ]);
        input.set_calc(FieldName::Net2, "100");

        let out = solve(&input);

        assert_eq!(out.value(FieldName::Net2), "82.50");
        assert_eq!(out.origin(FieldName::Net2), Origin::Calc);
    }

    #[test]
    fn stale_calc_net2_is_cleared() {
        let mut input = form(&[(FieldName::TargetMargin, "20")]);
        input.set_calc(FieldName::Net2, "55.00");

        let out = solve(&input);

        assert_eq!(out.value(FieldName::Net2), "");
        assert_eq!(out.origin(FieldName::Net2), Origin::Unset);
    }

    #[test]
    fn margins_use_sentinel_for_zero_price() {
        let out = solve(&form(&[(FieldName::Cost, "10"), (FieldName::Net1, "0")]));

        assert_eq!(out.value(FieldName::MarginNoDiscount), MARGIN_SENTINEL);
        assert_eq!(out.value(FieldName::MarginWithDiscount), MARGIN_SENTINEL);
    }

    #[test]
    fn failure_keeps_inputs_and_clears_margins() {
        let mut input = form(&[(FieldName::Cost, "80"), (FieldName::Discount, "150")]);
        input.set_calc(FieldName::MarginNoDiscount, "12.00");

        let out = solve(&input);

        assert_eq!(out.value(FieldName::Cost), "80");
        assert_eq!(out.value(FieldName::Discount), "150");
        assert_eq!(out.value(FieldName::MarginNoDiscount), "");
        assert_eq!(out.value(FieldName::MarginWithDiscount), "");
        assert_eq!(out.status(), "Discount must be between 0% and 100%.");
        assert_eq!(out.origin(FieldName::Status), Origin::Calc);
    }
}

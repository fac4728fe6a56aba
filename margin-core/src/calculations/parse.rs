use std::str::FromStr;

use rust_decimal::Decimal;

use crate::FieldName;
use crate::calculations::common::format_two_places;
use crate::calculations::solver::{MARGIN_SENTINEL, SolveError};

/// Normalizes input for decimal parsing: trims whitespace and treats a comma
/// as the decimal separator (e.g. `"12,50"`).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', ".")
}

/// Parses a field's display text into an optional [`Decimal`].
///
/// Empty or whitespace-only input means "no value" rather than zero.
/// Plain and scientific notation are accepted; anything else is reported
/// as [`SolveError::InvalidNumber`] naming the field.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use margin_core::FieldName;
/// use margin_core::calculations::parse::parse_optional_decimal;
///
/// assert_eq!(parse_optional_decimal(FieldName::Cost, "12,5").unwrap(), Some(dec!(12.5)));
/// assert_eq!(parse_optional_decimal(FieldName::Cost, "  ").unwrap(), None);
/// assert!(parse_optional_decimal(FieldName::Cost, "abc").is_err());
/// ```
pub fn parse_optional_decimal(
    field: FieldName,
    s: &str,
) -> Result<Option<Decimal>, SolveError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map(Some)
        .map_err(|e| {
            tracing::warn!(%field, input = %s, "invalid decimal: {}", e);
            SolveError::InvalidNumber {
                field,
                input: s.trim().to_string(),
            }
        })
}

/// Formats an optional [`Decimal`] for display, using the margin sentinel
/// when `None`.
pub fn opt_decimal_display(d: &Option<Decimal>) -> String {
    d.as_ref()
        .map(|v| format_two_places(*v))
        .unwrap_or_else(|| MARGIN_SENTINEL.to_string())
}

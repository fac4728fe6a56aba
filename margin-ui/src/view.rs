//! Plain-text rendering of the pricing form.

use std::fmt;

use margin_core::{FieldName, FormSnapshot, Origin};

/// Badge shown next to values the solver wrote.
pub const CALC_BADGE: &str = "[calc]";

/// Full on-screen label for a field, including its unit.
pub fn field_label(
    field: FieldName,
    currency: &str,
) -> String {
    let name = match field {
        FieldName::Cost => "Cost Price",
        FieldName::Net1 => "Net1 (Sales Price)",
        FieldName::AddedValue => "Added Value",
        FieldName::Discount => "Discount Percentage",
        FieldName::Net2 => "Net2 (Final Sales Price)",
        FieldName::TargetMargin => "Target Margin on Net2",
        FieldName::MarginNoDiscount => "Margin without Discount",
        FieldName::MarginWithDiscount => "Margin with Discount & Added Value",
        FieldName::Status => return "Status".to_string(),
    };
    let unit = if field.is_percentage() { "%" } else { currency };
    format!("{name} ({unit})")
}

/// Renders a snapshot as an aligned form, inputs first, then outputs.
pub struct FormView<'a> {
    snapshot: &'a FormSnapshot,
    currency: &'a str,
}

impl<'a> FormView<'a> {
    pub fn new(
        snapshot: &'a FormSnapshot,
        currency: &'a str,
    ) -> Self {
        Self { snapshot, currency }
    }

    fn label_width(&self) -> usize {
        FieldName::ALL
            .iter()
            .map(|f| field_label(*f, self.currency).chars().count())
            .max()
            .unwrap_or(0)
            + 1
    }

    fn write_row(
        &self,
        f: &mut fmt::Formatter<'_>,
        field: FieldName,
        width: usize,
    ) -> fmt::Result {
        let label = format!("{}:", field_label(field, self.currency));
        let value = self.snapshot.value(field);
        if self.snapshot.origin(field) == Origin::Calc && !field.is_output() {
            writeln!(f, "  {label:<width$} {value} {CALC_BADGE}")
        } else {
            writeln!(f, "  {label:<width$} {value}")
        }
    }
}

impl fmt::Display for FormView<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let width = self.label_width();

        writeln!(f, "Inputs")?;
        for field in FieldName::INPUTS {
            self.write_row(f, field, width)?;
        }

        writeln!(f, "Outputs")?;
        self.write_row(f, FieldName::MarginNoDiscount, width)?;
        self.write_row(f, FieldName::MarginWithDiscount, width)?;

        let status = self.snapshot.status();
        if status.is_empty() {
            write!(f, "Status: ok")
        } else {
            write!(f, "! {status}")
        }
    }
}

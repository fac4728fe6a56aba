//! Form session state for the margin calculator.
//!
//! This module holds the snapshot that persists between operator actions.
//! Every calculation hands the whole snapshot to the solver and replaces it
//! with the solver's answer.

use margin_core::{FieldName, FormSnapshot, Origin, PricingSolver};
use thiserror::Error;
use tracing::{debug, info};

/// Error returned when the operator tries to edit a solver-owned field.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{} is calculated and cannot be edited", .0.label())]
pub struct ReadOnlyField(pub FieldName);

/// The form between actions.
///
/// Holds no widgets, only the current [`FormSnapshot`] and the solver that
/// answers "Calculate".
#[derive(Debug, Clone, Default)]
pub struct FormSession {
    snapshot: FormSnapshot,
    solver: PricingSolver,
}

impl FormSession {
    /// Creates an empty session that solves with `solver`.
    pub fn new(solver: PricingSolver) -> Self {
        Self {
            snapshot: FormSnapshot::empty(),
            solver,
        }
    }

    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    /// Records text the operator typed into `field`.
    ///
    /// Blank text clears the field back to unset. Editing Net1 also mirrors
    /// it into Net2 unless the operator owns Net2.
    pub fn edit(
        &mut self,
        field: FieldName,
        text: &str,
    ) -> Result<(), ReadOnlyField> {
        if field.is_output() {
            return Err(ReadOnlyField(field));
        }

        let value = text.trim();
        self.snapshot.set_value(field, value);
        self.snapshot.set_origin(
            field,
            if value.is_empty() {
                Origin::Unset
            } else {
                Origin::User
            },
        );
        debug!(%field, value, "field edited");

        if field == FieldName::Net1 {
            self.sync_net2_from_net1(value);
        }
        Ok(())
    }

    /// Clears a field the operator no longer wants to supply.
    pub fn clear(
        &mut self,
        field: FieldName,
    ) -> Result<(), ReadOnlyField> {
        self.edit(field, "")
    }

    /// Keeps Net2 in step with Net1 until the operator types a Net2.
    fn sync_net2_from_net1(
        &mut self,
        net1: &str,
    ) {
        if self.snapshot.origin(FieldName::Net2).is_user() {
            return;
        }
        if net1.is_empty() {
            self.snapshot.set_value(FieldName::Net2, "");
            self.snapshot.set_origin(FieldName::Net2, Origin::Unset);
        } else {
            self.snapshot.set_calc(FieldName::Net2, net1);
        }
    }

    /// Runs the solver over the current form and adopts its answer.
    ///
    /// Returns the status message, empty on success.
    pub fn calculate(&mut self) -> &str {
        self.snapshot = self.solver.solve(&self.snapshot);
        if self.snapshot.has_error() {
            info!(status = self.snapshot.status(), "calculation rejected");
        } else {
            info!("calculation complete");
        }
        self.snapshot.status()
    }

    /// Wipes the form back to empty.
    pub fn reset(&mut self) {
        self.snapshot = FormSnapshot::empty();
        info!("form reset");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn edit_marks_field_as_user() {
        let mut session = FormSession::default();

        session.edit(FieldName::Cost, " 80 ").unwrap();

        assert_eq!(session.snapshot().value(FieldName::Cost), "80");
        assert_eq!(session.snapshot().origin(FieldName::Cost), Origin::User);
    }

    #[test]
    fn blank_edit_unsets_field() {
        let mut session = FormSession::default();
        session.edit(FieldName::Discount, "10").unwrap();

        session.clear(FieldName::Discount).unwrap();

        assert_eq!(session.snapshot().value(FieldName::Discount), "");
        assert_eq!(session.snapshot().origin(FieldName::Discount), Origin::Unset);
    }

    #[test]
    fn outputs_cannot_be_edited() {
        let mut session = FormSession::default();

        let result = session.edit(FieldName::MarginWithDiscount, "5");

        assert_eq!(result, Err(ReadOnlyField(FieldName::MarginWithDiscount)));
    }

    #[test]
    fn net1_is_mirrored_into_untouched_net2() {
        let mut session = FormSession::default();

        session.edit(FieldName::Net1, "150").unwrap();

        assert_eq!(session.snapshot().value(FieldName::Net2), "150");
        assert_eq!(session.snapshot().origin(FieldName::Net2), Origin::Calc);
    }

    #[test]
    fn clearing_net1_clears_mirrored_net2() {
        let mut session = FormSession::default();
        session.edit(FieldName::Net1, "150").unwrap();

        session.clear(FieldName::Net1).unwrap();

        assert_eq!(session.snapshot().value(FieldName::Net2), "");
        assert_eq!(session.snapshot().origin(FieldName::Net2), Origin::Unset);
    }

    #[test]
    fn user_net2_is_not_mirrored() {
        let mut session = FormSession::default();
        session.edit(FieldName::Net2, "90").unwrap();

        session.edit(FieldName::Net1, "100").unwrap();

        assert_eq!(session.snapshot().value(FieldName::Net2), "90");
        assert_eq!(session.snapshot().origin(FieldName::Net2), Origin::User);
    }

    #[test]
    fn reset_empties_the_form() {
        let mut session = FormSession::default();
        session.edit(FieldName::Cost, "80").unwrap();
        session.calculate();

        session.reset();

        assert_eq!(session.snapshot(), &FormSnapshot::empty());
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// The nine named slots on the pricing form.
///
/// The first six are free inputs that either the operator or the solver may
/// own; the last three are always written by the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldName {
    #[serde(rename = "cost")]
    Cost,
    #[serde(rename = "net1")]
    Net1,
    #[serde(rename = "added_value")]
    AddedValue,
    #[serde(rename = "discount")]
    Discount,
    #[serde(rename = "net2")]
    Net2,
    #[serde(rename = "target_margin")]
    TargetMargin,
    #[serde(rename = "m_no")]
    MarginNoDiscount,
    #[serde(rename = "m_with")]
    MarginWithDiscount,
    #[serde(rename = "status")]
    Status,
}

impl FieldName {
    /// Every field, in form order.
    pub const ALL: [FieldName; 9] = [
        Self::Cost,
        Self::Net1,
        Self::AddedValue,
        Self::Discount,
        Self::Net2,
        Self::TargetMargin,
        Self::MarginNoDiscount,
        Self::MarginWithDiscount,
        Self::Status,
    ];

    /// The operator-editable fields, in form order.
    pub const INPUTS: [FieldName; 6] = [
        Self::Cost,
        Self::Net1,
        Self::AddedValue,
        Self::Discount,
        Self::Net2,
        Self::TargetMargin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Net1 => "net1",
            Self::AddedValue => "added_value",
            Self::Discount => "discount",
            Self::Net2 => "net2",
            Self::TargetMargin => "target_margin",
            Self::MarginNoDiscount => "m_no",
            Self::MarginWithDiscount => "m_with",
            Self::Status => "status",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cost" => Some(Self::Cost),
            "net1" => Some(Self::Net1),
            "added_value" => Some(Self::AddedValue),
            "discount" => Some(Self::Discount),
            "net2" => Some(Self::Net2),
            "target_margin" => Some(Self::TargetMargin),
            "m_no" => Some(Self::MarginNoDiscount),
            "m_with" => Some(Self::MarginWithDiscount),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// Short human label, used in status messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cost => "Cost Price",
            Self::Net1 => "Net1",
            Self::AddedValue => "Added Value",
            Self::Discount => "Discount",
            Self::Net2 => "Net2",
            Self::TargetMargin => "Target Margin",
            Self::MarginNoDiscount => "Margin without Discount",
            Self::MarginWithDiscount => "Margin with Discount & Added Value",
            Self::Status => "Status",
        }
    }

    /// Returns `true` for the fields only the solver may write.
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            Self::MarginNoDiscount | Self::MarginWithDiscount | Self::Status
        )
    }

    /// Returns `true` for fields entered as percentages rather than money.
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            Self::Discount
                | Self::TargetMargin
                | Self::MarginNoDiscount
                | Self::MarginWithDiscount
        )
    }
}

impl fmt::Display for FieldName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who last wrote a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Origin {
    /// Never written, or cleared by the operator.
    #[default]
    #[serde(rename = "")]
    Unset,
    /// Typed by the operator.
    #[serde(rename = "user")]
    User,
    /// Written by the solver (or mirrored by the form).
    #[serde(rename = "calc")]
    Calc,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::User => "user",
            Self::Calc => "calc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" => Some(Self::Unset),
            "user" => Some(Self::User),
            "calc" => Some(Self::Calc),
            _ => None,
        }
    }

    pub fn is_user(&self) -> bool {
        *self == Self::User
    }
}

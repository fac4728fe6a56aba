use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{FieldName, Origin};

/// A full copy of the form: every field's display text and origin.
///
/// The solver takes one of these and returns a replacement; it never keeps
/// one between calls. Missing entries read as an empty string with
/// [`Origin::Unset`], so a snapshot assembled from a partial map is still
/// usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    values: BTreeMap<FieldName, String>,
    origins: BTreeMap<FieldName, Origin>,
}

impl Default for FormSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl FormSnapshot {
    /// The reset state: all fields empty and unset.
    pub fn empty() -> Self {
        Self {
            values: FieldName::ALL.iter().map(|f| (*f, String::new())).collect(),
            origins: FieldName::ALL.iter().map(|f| (*f, Origin::Unset)).collect(),
        }
    }

    /// Builds a snapshot from loosely keyed maps, as a form toolkit would
    /// hand them over. Unknown keys and unknown origin tags are ignored.
    pub fn from_string_maps<'a>(
        values: impl IntoIterator<Item = (&'a str, &'a str)>,
        origins: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut snapshot = Self::empty();
        for (key, text) in values {
            if let Some(field) = FieldName::parse(key) {
                snapshot.set_value(field, text);
            }
        }
        for (key, tag) in origins {
            if let (Some(field), Some(origin)) = (FieldName::parse(key), Origin::parse(tag)) {
                snapshot.set_origin(field, origin);
            }
        }
        snapshot
    }

    pub fn value(
        &self,
        field: FieldName,
    ) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn origin(
        &self,
        field: FieldName,
    ) -> Origin {
        self.origins.get(&field).copied().unwrap_or_default()
    }

    pub fn set_value(
        &mut self,
        field: FieldName,
        text: impl Into<String>,
    ) {
        self.values.insert(field, text.into());
    }

    pub fn set_origin(
        &mut self,
        field: FieldName,
        origin: Origin,
    ) {
        self.origins.insert(field, origin);
    }

    /// Records a value the operator typed.
    pub fn set_user(
        &mut self,
        field: FieldName,
        text: impl Into<String>,
    ) {
        self.set_value(field, text);
        self.set_origin(field, Origin::User);
    }

    /// Records a value written by the solver.
    pub fn set_calc(
        &mut self,
        field: FieldName,
        text: impl Into<String>,
    ) {
        self.set_value(field, text);
        self.set_origin(field, Origin::Calc);
    }

    /// The status message; empty after a successful calculation.
    pub fn status(&self) -> &str {
        self.value(FieldName::Status)
    }

    pub fn has_error(&self) -> bool {
        !self.status().is_empty()
    }

    /// Iterates `(field, value, origin)` in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str, Origin)> + '_ {
        FieldName::ALL
            .into_iter()
            .map(|f| (f, self.value(f), self.origin(f)))
    }

    /// The value map keyed by the form's string keys.
    pub fn values_by_key(&self) -> BTreeMap<&'static str, String> {
        self.iter()
            .map(|(f, v, _)| (f.as_str(), v.to_string()))
            .collect()
    }

    /// The origin map keyed by the form's string keys.
    pub fn origins_by_key(&self) -> BTreeMap<&'static str, &'static str> {
        self.iter()
            .map(|(f, _, o)| (f.as_str(), o.as_str()))
            .collect()
    }
}

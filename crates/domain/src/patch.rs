//! Merge-patch field representation.
//!
//! A JSON merge patch distinguishes three states per field: not present,
//! explicitly `null`, and a new value. `Option<T>` cannot tell the first
//! two apart, hence [`PatchField`].

use serde::{Deserialize, Deserializer};

use crate::error::FieldError;

/// One field of a merge patch.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchField<T> {
    /// The field was not supplied; keep the current value.
    Absent,
    /// The field was supplied as `null`.
    Null,
    /// The field was supplied with a new value.
    Value(T),
}

impl<T> Default for PatchField<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> PatchField<T> {
    /// Borrow the supplied value, if any.
    #[must_use]
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Reject `null` for a field that cannot be cleared.
    pub(crate) fn require(&self, field: &str, errors: &mut Vec<FieldError>) {
        if matches!(self, Self::Null) {
            errors.push(FieldError::required(field));
        }
    }

    /// Overwrite `target` when a value was supplied.
    pub(crate) fn merge_into(self, target: &mut T) {
        if let Self::Value(value) = self {
            *target = value;
        }
    }
}

impl<'de, T> Deserialize<'de> for PatchField<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; absence comes from `#[serde(default)]`.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Value(value),
            None => Self::Null,
        })
    }
}

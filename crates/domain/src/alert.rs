//! Alert — a message attached to a temperature reading.
//!
//! The relation to the reading is an explicit foreign-key value. The
//! reading itself is only materialized on request (`$expand`), by the
//! application layer asking the reading repository for it.

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ThermoDataError, ValidationError};
use crate::id::{AlertId, TemperatureReadingId};
use crate::patch::PatchField;
use crate::query::{FieldDef, FieldKind, Navigation, Queryable, Value};
use crate::temperature_reading::TemperatureReading;

/// Maximum length of [`Alert::message`], in characters.
pub const MESSAGE_MAX_LEN: usize = 250;

/// Navigation property inlining the referenced reading.
pub const TEMPERATURE_READING_NAVIGATION: &str = "temperatureReading";

/// A persisted alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    pub message: String,
    pub temperature_reading_id: TemperatureReadingId,
}

/// A validated alert that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub message: String,
    pub temperature_reading_id: TemperatureReadingId,
}

impl NewAlert {
    /// Create a builder for constructing a [`NewAlert`].
    #[must_use]
    pub fn builder() -> AlertBuilder {
        AlertBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] when the message is blank or
    /// too long.
    pub fn validate(&self) -> Result<(), ThermoDataError> {
        let mut errors = Vec::new();
        check_message(&self.message, &mut errors);
        ValidationError::check(errors)?;
        Ok(())
    }

    /// Attach the store-assigned id.
    #[must_use]
    pub fn with_id(self, id: AlertId) -> Alert {
        Alert {
            id,
            message: self.message,
            temperature_reading_id: self.temperature_reading_id,
        }
    }
}

/// Step-by-step builder for [`NewAlert`].
#[derive(Debug, Default)]
pub struct AlertBuilder {
    message: Option<String>,
    temperature_reading_id: Option<TemperatureReadingId>,
}

impl AlertBuilder {
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn temperature_reading_id(mut self, id: TemperatureReadingId) -> Self {
        self.temperature_reading_id = Some(id);
        self
    }

    /// Consume the builder, validate, and return a [`NewAlert`].
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] listing every missing or
    /// invalid field.
    pub fn build(self) -> Result<NewAlert, ThermoDataError> {
        let mut errors = Vec::new();
        match &self.message {
            Some(message) => check_message(message, &mut errors),
            None => errors.push(FieldError::required("message")),
        }
        if self.temperature_reading_id.is_none() {
            errors.push(FieldError::required("temperatureReadingId"));
        }

        match (self.message, self.temperature_reading_id) {
            (Some(message), Some(temperature_reading_id)) if errors.is_empty() => Ok(NewAlert {
                message,
                temperature_reading_id,
            }),
            _ => Err(ValidationError { errors }.into()),
        }
    }
}

/// Merge patch for an [`Alert`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AlertPatch {
    #[serde(default)]
    pub message: PatchField<String>,
    #[serde(default)]
    pub temperature_reading_id: PatchField<TemperatureReadingId>,
}

impl AlertPatch {
    /// Validate every supplied field.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] when a required field is
    /// `null` or the message is blank or too long.
    pub fn validate(&self) -> Result<(), ThermoDataError> {
        let mut errors = Vec::new();
        self.message.require("message", &mut errors);
        self.temperature_reading_id
            .require("temperatureReadingId", &mut errors);
        if let Some(message) = self.message.as_value() {
            check_message(message, &mut errors);
        }
        ValidationError::check(errors)?;
        Ok(())
    }

    /// Merge the supplied fields onto `alert`.
    pub fn apply_to(self, alert: &mut Alert) {
        self.message.merge_into(&mut alert.message);
        self.temperature_reading_id
            .merge_into(&mut alert.temperature_reading_id);
    }
}

fn check_message(message: &str, errors: &mut Vec<FieldError>) {
    if message.trim().is_empty() {
        errors.push(FieldError::required("message"));
    } else if message.chars().count() > MESSAGE_MAX_LEN {
        errors.push(FieldError::new(
            "message",
            format!("the message field must be at most {MESSAGE_MAX_LEN} characters"),
        ));
    }
}

impl Queryable for Alert {
    const TYPE_NAME: &'static str = "Alert";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("id", FieldKind::Int),
        FieldDef::new("message", FieldKind::String),
        FieldDef::new("temperatureReadingId", FieldKind::Int),
    ];
    const NAVIGATIONS: &'static [Navigation] = &[Navigation {
        name: TEMPERATURE_READING_NAVIGATION,
        target: <TemperatureReading as Queryable>::TYPE_NAME,
        fields: <TemperatureReading as Queryable>::FIELDS,
    }];

    fn field_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::Int(self.id.get())),
            "message" => Some(Value::String(self.message.clone())),
            "temperatureReadingId" => Some(Value::Int(self.temperature_reading_id.get())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading_id() -> TemperatureReadingId {
        TemperatureReadingId::new(1)
    }

    fn field_names(err: ThermoDataError) -> Vec<String> {
        match err {
            ThermoDataError::Validation(v) => v.errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn should_build_valid_alert() {
        let alert = NewAlert::builder()
            .message("Freezer too warm")
            .temperature_reading_id(reading_id())
            .build()
            .unwrap();
        assert_eq!(alert.message, "Freezer too warm");
    }

    #[test]
    fn should_reject_blank_message_on_constructed_alert() {
        let alert = NewAlert {
            message: "   ".to_string(),
            temperature_reading_id: reading_id(),
        };
        assert_eq!(field_names(alert.validate().unwrap_err()), vec!["message"]);
    }

    #[test]
    fn should_accept_message_at_max_length() {
        let result = NewAlert::builder()
            .message("é".repeat(MESSAGE_MAX_LEN))
            .temperature_reading_id(reading_id())
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn should_reject_message_over_max_length() {
        let err = NewAlert::builder()
            .message("x".repeat(MESSAGE_MAX_LEN + 1))
            .temperature_reading_id(reading_id())
            .build()
            .unwrap_err();
        assert_eq!(field_names(err), vec!["message"]);
    }

    #[test]
    fn should_reject_blank_message() {
        let err = NewAlert::builder()
            .message("   ")
            .temperature_reading_id(reading_id())
            .build()
            .unwrap_err();
        assert_eq!(field_names(err), vec!["message"]);
    }

    #[test]
    fn should_report_every_missing_field() {
        let err = NewAlert::builder().build().unwrap_err();
        assert_eq!(field_names(err), vec!["message", "temperatureReadingId"]);
    }

    #[test]
    fn should_leave_reading_reference_untouched_when_patching_message() {
        let mut alert = NewAlert::builder()
            .message("old")
            .temperature_reading_id(TemperatureReadingId::new(9))
            .build()
            .unwrap()
            .with_id(AlertId::new(1));

        let patch: AlertPatch = serde_json::from_str(r#"{"message": "new"}"#).unwrap();
        patch.validate().unwrap();
        patch.apply_to(&mut alert);

        assert_eq!(alert.message, "new");
        assert_eq!(alert.temperature_reading_id, TemperatureReadingId::new(9));
    }

    #[test]
    fn should_reject_null_message_in_patch() {
        let patch: AlertPatch = serde_json::from_str(r#"{"message": null}"#).unwrap();
        assert_eq!(field_names(patch.validate().unwrap_err()), vec!["message"]);
    }

    #[test]
    fn should_expose_reading_navigation() {
        assert_eq!(Alert::NAVIGATIONS[0].name, "temperatureReading");
        assert_eq!(Alert::NAVIGATIONS[0].fields.len(), 3);
    }
}

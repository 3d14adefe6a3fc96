//! Temperature reading — a measured temperature at a point in time.

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, ThermoDataError, ValidationError};
use crate::id::TemperatureReadingId;
use crate::patch::PatchField;
use crate::query::{FieldDef, FieldKind, Queryable, Value};
use crate::time::Timestamp;

/// Lowest physically possible temperature, in degrees Celsius.
pub const ABSOLUTE_ZERO: f64 = -273.15;

/// A persisted temperature reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureReading {
    pub id: TemperatureReadingId,
    pub measure_date_time: Timestamp,
    pub temperature: f64,
}

/// A validated reading that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemperatureReading {
    pub measure_date_time: Timestamp,
    pub temperature: f64,
}

impl NewTemperatureReading {
    /// Create a builder for constructing a [`NewTemperatureReading`].
    #[must_use]
    pub fn builder() -> TemperatureReadingBuilder {
        TemperatureReadingBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] when `temperature` is below
    /// absolute zero.
    pub fn validate(&self) -> Result<(), ThermoDataError> {
        let mut errors = Vec::new();
        check_temperature(self.temperature, &mut errors);
        ValidationError::check(errors)?;
        Ok(())
    }

    /// Attach the store-assigned id.
    #[must_use]
    pub fn with_id(self, id: TemperatureReadingId) -> TemperatureReading {
        TemperatureReading {
            id,
            measure_date_time: self.measure_date_time,
            temperature: self.temperature,
        }
    }
}

/// Step-by-step builder for [`NewTemperatureReading`].
#[derive(Debug, Default)]
pub struct TemperatureReadingBuilder {
    measure_date_time: Option<Timestamp>,
    temperature: Option<f64>,
}

impl TemperatureReadingBuilder {
    #[must_use]
    pub fn measure_date_time(mut self, measure_date_time: Timestamp) -> Self {
        self.measure_date_time = Some(measure_date_time);
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Consume the builder, validate, and return a [`NewTemperatureReading`].
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] listing every missing or
    /// out-of-range field.
    pub fn build(self) -> Result<NewTemperatureReading, ThermoDataError> {
        let mut errors = Vec::new();
        if self.measure_date_time.is_none() {
            errors.push(FieldError::required("measureDateTime"));
        }
        match self.temperature {
            Some(temperature) => check_temperature(temperature, &mut errors),
            None => errors.push(FieldError::required("temperature")),
        }

        match (self.measure_date_time, self.temperature) {
            (Some(measure_date_time), Some(temperature)) if errors.is_empty() => {
                Ok(NewTemperatureReading {
                    measure_date_time,
                    temperature,
                })
            }
            _ => Err(ValidationError { errors }.into()),
        }
    }
}

/// Merge patch for a [`TemperatureReading`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemperatureReadingPatch {
    #[serde(default)]
    pub measure_date_time: PatchField<Timestamp>,
    #[serde(default)]
    pub temperature: PatchField<f64>,
}

impl TemperatureReadingPatch {
    /// Validate every supplied field.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] when a required field is
    /// `null` or `temperature` is below absolute zero.
    pub fn validate(&self) -> Result<(), ThermoDataError> {
        let mut errors = Vec::new();
        self.measure_date_time.require("measureDateTime", &mut errors);
        self.temperature.require("temperature", &mut errors);
        if let Some(&temperature) = self.temperature.as_value() {
            check_temperature(temperature, &mut errors);
        }
        ValidationError::check(errors)?;
        Ok(())
    }

    /// Merge the supplied fields onto `reading`.
    pub fn apply_to(self, reading: &mut TemperatureReading) {
        self.measure_date_time
            .merge_into(&mut reading.measure_date_time);
        self.temperature.merge_into(&mut reading.temperature);
    }
}

fn check_temperature(temperature: f64, errors: &mut Vec<FieldError>) {
    if temperature.is_nan() || temperature < ABSOLUTE_ZERO {
        errors.push(FieldError::new(
            "temperature",
            format!("the temperature field must be at least {ABSOLUTE_ZERO}"),
        ));
    }
}

impl Queryable for TemperatureReading {
    const TYPE_NAME: &'static str = "TemperatureReading";
    const FIELDS: &'static [FieldDef] = &[
        FieldDef::new("id", FieldKind::Int),
        FieldDef::new("measureDateTime", FieldKind::DateTime),
        FieldDef::new("temperature", FieldKind::Float),
    ];

    fn field_value(&self, field: &str) -> Option<Value> {
        match field {
            "id" => Some(Value::Int(self.id.get())),
            "measureDateTime" => Some(Value::DateTime(self.measure_date_time)),
            "temperature" => Some(Value::Float(self.temperature)),
            _ => None,
        }
    }
}

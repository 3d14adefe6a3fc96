//! Storage port — repository traits for persistence.
//!
//! Repositories are collection-scoped: each one adds, removes, reads and
//! saves records of a single entity type. Identifiers are assigned by the
//! store on `create`.

use std::future::Future;

use thermodata_domain::alert::{Alert, NewAlert};
use thermodata_domain::error::ThermoDataError;
use thermodata_domain::id::{AlertId, TemperatureReadingId};
use thermodata_domain::temperature_reading::{NewTemperatureReading, TemperatureReading};

/// Repository for persisting and querying [`TemperatureReading`]s.
pub trait TemperatureReadingRepository {
    /// Insert a new reading and return it with its assigned id.
    fn create(
        &self,
        reading: NewTemperatureReading,
    ) -> impl Future<Output = Result<TemperatureReading, ThermoDataError>> + Send;

    /// Get a reading by its unique identifier.
    fn get_by_id(
        &self,
        id: TemperatureReadingId,
    ) -> impl Future<Output = Result<Option<TemperatureReading>, ThermoDataError>> + Send;

    /// Get all readings, in ascending id order.
    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<TemperatureReading>, ThermoDataError>> + Send;

    /// Save every field of an existing reading. A reading that no longer
    /// exists yields [`ThermoDataError::NotFound`].
    fn update(
        &self,
        reading: TemperatureReading,
    ) -> impl Future<Output = Result<TemperatureReading, ThermoDataError>> + Send;

    /// Delete a reading and, through the store, every alert referencing it.
    ///
    /// Returns `false` when no reading had that id.
    fn delete(
        &self,
        id: TemperatureReadingId,
    ) -> impl Future<Output = Result<bool, ThermoDataError>> + Send;
}

/// Repository for persisting and querying [`Alert`]s.
pub trait AlertRepository {
    /// Insert a new alert and return it with its assigned id.
    ///
    /// A dangling `temperature_reading_id` is reported as a validation error.
    fn create(
        &self,
        alert: NewAlert,
    ) -> impl Future<Output = Result<Alert, ThermoDataError>> + Send;

    /// Get an alert by its unique identifier.
    fn get_by_id(
        &self,
        id: AlertId,
    ) -> impl Future<Output = Result<Option<Alert>, ThermoDataError>> + Send;

    /// Get all alerts, in ascending id order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Alert>, ThermoDataError>> + Send;

    /// Save every field of an existing alert. An alert that no longer exists
    /// yields [`ThermoDataError::NotFound`].
    fn update(&self, alert: Alert) -> impl Future<Output = Result<Alert, ThermoDataError>> + Send;

    /// Delete an alert. Returns `false` when no alert had that id.
    fn delete(&self, id: AlertId) -> impl Future<Output = Result<bool, ThermoDataError>> + Send;
}

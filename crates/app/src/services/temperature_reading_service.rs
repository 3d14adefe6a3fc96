//! Temperature reading service — use-cases for managing readings.

use thermodata_domain::error::{NotFoundError, ThermoDataError};
use thermodata_domain::id::TemperatureReadingId;
use thermodata_domain::query::{QueryOptions, QuerySettings};
use thermodata_domain::temperature_reading::{
    NewTemperatureReading, TemperatureReading, TemperatureReadingPatch,
};

use crate::ports::TemperatureReadingRepository;
use crate::services::RecordPage;

/// Application service for reading CRUD operations.
pub struct TemperatureReadingService<R> {
    repo: R,
    query_settings: QuerySettings,
}

impl<R: TemperatureReadingRepository> TemperatureReadingService<R> {
    /// Create a new service backed by the given repository.
    ///
    /// Readings accept every query option by default.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            query_settings: QuerySettings::all(),
        }
    }

    /// Replace the query capabilities of the list operation.
    #[must_use]
    pub fn with_query_settings(mut self, query_settings: QuerySettings) -> Self {
        self.query_settings = query_settings;
        self
    }

    /// List readings, applying the query options in `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Query`] if the options are malformed or not
    /// allowed, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_readings(
        &self,
        query: &[(String, String)],
    ) -> Result<RecordPage, ThermoDataError> {
        let options = QueryOptions::parse::<TemperatureReading>(query, &self.query_settings)?;
        let readings = self.repo.get_all().await?;
        Ok(options
            .apply(readings)
            .map(|reading| options.project(&reading)))
    }

    /// Look up a reading by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::NotFound`] when no reading with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_reading(
        &self,
        id: TemperatureReadingId,
    ) -> Result<TemperatureReading, ThermoDataError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "TemperatureReading",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Store a new reading after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, reading), fields(temperature = reading.temperature))]
    pub async fn create_reading(
        &self,
        reading: NewTemperatureReading,
    ) -> Result<TemperatureReading, ThermoDataError> {
        reading.validate()?;
        self.repo.create(reading).await
    }

    /// Merge the supplied fields onto an existing reading.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] if the patch is invalid,
    /// [`ThermoDataError::NotFound`] if the reading does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, patch))]
    pub async fn patch_reading(
        &self,
        id: TemperatureReadingId,
        patch: TemperatureReadingPatch,
    ) -> Result<TemperatureReading, ThermoDataError> {
        patch.validate()?;
        let mut reading = self.get_reading(id).await?;
        patch.apply_to(&mut reading);
        self.repo.update(reading).await
    }

    /// Delete a reading by id. Alerts referencing it go with it.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::NotFound`] if the reading does not exist,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_reading(&self, id: TemperatureReadingId) -> Result<(), ThermoDataError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "TemperatureReading",
                id: id.to_string(),
            }
            .into())
        }
    }
}

//! Alert service — use-cases for managing alerts.
//!
//! Alerts reference a reading by id. Creation and updates check that the
//! referenced reading exists, and `$expand=temperatureReading` inlines it.

use std::collections::HashMap;

use thermodata_domain::alert::{Alert, AlertPatch, NewAlert, TEMPERATURE_READING_NAVIGATION};
use thermodata_domain::error::{FieldError, NotFoundError, ThermoDataError, ValidationError};
use thermodata_domain::id::{AlertId, TemperatureReadingId};
use thermodata_domain::query::{QueryOptions, QuerySettings, Record, project};

use crate::ports::{AlertRepository, TemperatureReadingRepository};
use crate::services::RecordPage;

/// Application service for alert CRUD operations.
pub struct AlertService<A, R> {
    repo: A,
    readings: R,
    query_settings: QuerySettings,
}

impl<A, R> AlertService<A, R>
where
    A: AlertRepository,
    R: TemperatureReadingRepository,
{
    /// Create a new service backed by the given repositories.
    ///
    /// Alerts accept the safe query option subset by default; `$expand` and
    /// `$count` must be enabled with [`Self::with_query_settings`].
    pub fn new(repo: A, readings: R) -> Self {
        Self {
            repo,
            readings,
            query_settings: QuerySettings::default(),
        }
    }

    #[must_use]
    pub fn with_query_settings(mut self, query_settings: QuerySettings) -> Self {
        self.query_settings = query_settings;
        self
    }

    /// List alerts, applying the query options in `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Query`] if the options are malformed or not
    /// allowed, or a storage error from either repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_alerts(&self, query: &[(String, String)]) -> Result<RecordPage, ThermoDataError> {
        let options = QueryOptions::parse::<Alert>(query, &self.query_settings)?;
        let alerts = self.repo.get_all().await?;
        let page = options.apply(alerts);

        let Some(expand) = options.expansion(TEMPERATURE_READING_NAVIGATION) else {
            return Ok(page.map(|alert| options.project(&alert)));
        };

        let mut readings = HashMap::new();
        let mut items = Vec::with_capacity(page.items.len());
        for alert in &page.items {
            let reading_id = alert.temperature_reading_id;
            if !readings.contains_key(&reading_id) {
                let reading = self.readings.get_by_id(reading_id).await?;
                readings.insert(reading_id, reading);
            }
            let inlined = readings
                .get(&reading_id)
                .and_then(Option::as_ref)
                .map_or(serde_json::Value::Null, |reading| {
                    serde_json::Value::Object(project(reading, &expand.select))
                });

            let mut record: Record = options.project(alert);
            record.insert(TEMPERATURE_READING_NAVIGATION.to_string(), inlined);
            items.push(record);
        }

        Ok(RecordPage {
            items,
            count: page.count,
        })
    }

    /// Look up an alert by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::NotFound`] when no alert with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_alert(&self, id: AlertId) -> Result<Alert, ThermoDataError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Alert",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Store a new alert after validating it and checking that its reading
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] if invariants fail or the
    /// referenced reading does not exist, or a storage error from either
    /// repository.
    #[tracing::instrument(skip(self, alert), fields(reading_id = %alert.temperature_reading_id))]
    pub async fn create_alert(&self, alert: NewAlert) -> Result<Alert, ThermoDataError> {
        alert.validate()?;
        self.ensure_reading_exists(alert.temperature_reading_id)
            .await?;
        self.repo.create(alert).await
    }

    /// Merge the supplied fields onto an existing alert.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::Validation`] if the patch is invalid or
    /// points at a missing reading, [`ThermoDataError::NotFound`] if the alert
    /// does not exist, or a storage error from either repository.
    #[tracing::instrument(skip(self, patch))]
    pub async fn patch_alert(&self, id: AlertId, patch: AlertPatch) -> Result<Alert, ThermoDataError> {
        patch.validate()?;
        let mut alert = self.get_alert(id).await?;
        if let Some(&reading_id) = patch.temperature_reading_id.as_value() {
            self.ensure_reading_exists(reading_id).await?;
        }
        patch.apply_to(&mut alert);
        self.repo.update(alert).await
    }

    /// Delete an alert by id.
    ///
    /// # Errors
    ///
    /// Returns [`ThermoDataError::NotFound`] if the alert does not exist, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_alert(&self, id: AlertId) -> Result<(), ThermoDataError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "Alert",
                id: id.to_string(),
            }
            .into())
        }
    }

    async fn ensure_reading_exists(&self, id: TemperatureReadingId) -> Result<(), ThermoDataError> {
        if self.readings.get_by_id(id).await?.is_some() {
            return Ok(());
        }
        tracing::debug!(%id, "alert references a missing reading");
        Err(ValidationError::single(FieldError::new(
            "temperatureReadingId",
            format!("temperature reading {id} does not exist"),
        ))
        .into())
    }
}

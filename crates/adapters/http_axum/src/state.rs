//! Shared application state for axum handlers.

use std::sync::Arc;

use thermodata_app::ports::{AlertRepository, TemperatureReadingRepository};
use thermodata_app::services::alert_service::AlertService;
use thermodata_app::services::temperature_reading_service::TemperatureReadingService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types to avoid dynamic dispatch.
/// `Clone` is implemented manually so the repositories themselves do not
/// need to be `Clone`, only the `Arc` wrappers are cloned.
pub struct AppState<RR, AR> {
    /// Temperature reading CRUD service.
    pub reading_service: Arc<TemperatureReadingService<RR>>,
    /// Alert CRUD service; resolves readings through its own repository.
    pub alert_service: Arc<AlertService<AR, RR>>,
}

impl<RR, AR> Clone for AppState<RR, AR> {
    fn clone(&self) -> Self {
        Self {
            reading_service: Arc::clone(&self.reading_service),
            alert_service: Arc::clone(&self.alert_service),
        }
    }
}

impl<RR, AR> AppState<RR, AR>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        reading_service: TemperatureReadingService<RR>,
        alert_service: AlertService<AR, RR>,
    ) -> Self {
        Self {
            reading_service: Arc::new(reading_service),
            alert_service: Arc::new(alert_service),
        }
    }
}

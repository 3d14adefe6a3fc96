//! JSON API handler modules.
//!
//! Collections live at `/{Set}`; single entities are addressed with the
//! OData key syntax `/{Set}({id})` and dispatched by [`entity_key`].

#[allow(clippy::missing_errors_doc)]
pub mod alerts;
pub mod entity_key;
#[allow(clippy::missing_errors_doc)]
pub mod temperature_readings;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;

use thermodata_app::ports::{AlertRepository, TemperatureReadingRepository};
use thermodata_app::services::RecordPage;
use thermodata_domain::query::Record;

use crate::state::AppState;

/// Entity set name of temperature readings.
pub const TEMPERATURE_READINGS: &str = "TemperatureReadings";
/// Entity set name of alerts.
pub const ALERTS: &str = "Alerts";

/// Build the API routes.
pub fn routes<RR, AR>() -> Router<AppState<RR, AR>>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/TemperatureReadings",
            get(temperature_readings::list::<RR, AR>).post(temperature_readings::create::<RR, AR>),
        )
        .route(
            "/Alerts",
            get(alerts::list::<RR, AR>).post(alerts::create::<RR, AR>),
        )
        .route(
            "/{key}",
            get(entity_key::get::<RR, AR>)
                .patch(entity_key::patch::<RR, AR>)
                .delete(entity_key::delete::<RR, AR>),
        )
}

/// Collection response body: `{"@odata.count"?: n, "value": [...]}`.
#[derive(Serialize)]
pub struct Collection {
    #[serde(rename = "@odata.count", skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub value: Vec<Record>,
}

impl From<RecordPage> for Collection {
    fn from(page: RecordPage) -> Self {
        Self {
            count: page.count,
            value: page.items,
        }
    }
}

/// Possible responses from a list endpoint.
pub enum ListResponse {
    Ok(Json<Collection>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from a create endpoint.
pub enum CreateResponse<T> {
    /// Carries the canonical `/{Set}({id})` location of the new entity.
    Created { location: String, body: Json<T> },
}

impl<T: Serialize> IntoResponse for CreateResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Created { location, body } => {
                (StatusCode::CREATED, [(LOCATION, location)], body).into_response()
            }
        }
    }
}

/// Canonical URL path of one entity.
pub(crate) fn entity_path(set: &str, id: impl std::fmt::Display) -> String {
    format!("/{set}({id})")
}

//! JSON handlers for the `TemperatureReadings` collection.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde::Deserialize;

use thermodata_app::ports::{AlertRepository, TemperatureReadingRepository};
use thermodata_domain::temperature_reading::{NewTemperatureReading, TemperatureReading};
use thermodata_domain::time::Timestamp;

use super::{CreateResponse, ListResponse, TEMPERATURE_READINGS, entity_path};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a reading.
///
/// Fields are optional so that missing ones are reported as field errors;
/// a client-supplied `id` is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemperatureReadingRequest {
    pub measure_date_time: Option<Timestamp>,
    pub temperature: Option<f64>,
}

impl CreateTemperatureReadingRequest {
    fn into_new(self) -> Result<NewTemperatureReading, ApiError> {
        let mut builder = NewTemperatureReading::builder();
        if let Some(measure_date_time) = self.measure_date_time {
            builder = builder.measure_date_time(measure_date_time);
        }
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        Ok(builder.build()?)
    }
}

/// `GET /TemperatureReadings`
pub async fn list<RR, AR>(
    State(state): State<AppState<RR, AR>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<ListResponse, ApiError>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    let Query(pairs) = query?;
    let page = state.reading_service.list_readings(&pairs).await?;
    Ok(ListResponse::Ok(Json(page.into())))
}

/// `POST /TemperatureReadings`
pub async fn create<RR, AR>(
    State(state): State<AppState<RR, AR>>,
    body: Result<Json<CreateTemperatureReadingRequest>, JsonRejection>,
) -> Result<CreateResponse<TemperatureReading>, ApiError>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let created = state.reading_service.create_reading(req.into_new()?).await?;
    Ok(CreateResponse::Created {
        location: entity_path(TEMPERATURE_READINGS, created.id),
        body: Json(created),
    })
}

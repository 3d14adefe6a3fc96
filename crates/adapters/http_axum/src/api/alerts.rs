//! JSON handlers for the `Alerts` collection.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde::Deserialize;

use thermodata_app::ports::{AlertRepository, TemperatureReadingRepository};
use thermodata_domain::alert::{Alert, NewAlert};
use thermodata_domain::id::TemperatureReadingId;

use super::{ALERTS, CreateResponse, ListResponse, entity_path};
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an alert. A client-supplied `id` is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub message: Option<String>,
    pub temperature_reading_id: Option<TemperatureReadingId>,
}

impl CreateAlertRequest {
    fn into_new(self) -> Result<NewAlert, ApiError> {
        let mut builder = NewAlert::builder();
        if let Some(message) = self.message {
            builder = builder.message(message);
        }
        if let Some(reading_id) = self.temperature_reading_id {
            builder = builder.temperature_reading_id(reading_id);
        }
        Ok(builder.build()?)
    }
}

/// `GET /Alerts`
pub async fn list<RR, AR>(
    State(state): State<AppState<RR, AR>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<ListResponse, ApiError>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    let Query(pairs) = query?;
    let page = state.alert_service.list_alerts(&pairs).await?;
    Ok(ListResponse::Ok(Json(page.into())))
}

/// `POST /Alerts`
pub async fn create<RR, AR>(
    State(state): State<AppState<RR, AR>>,
    body: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Result<CreateResponse<Alert>, ApiError>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    let Json(req) = body?;
    let created = state.alert_service.create_alert(req.into_new()?).await?;
    Ok(CreateResponse::Created {
        location: entity_path(ALERTS, created.id),
        body: Json(created),
    })
}

//! Single-entity handlers addressed by OData key syntax, e.g. `/Alerts(3)`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use thermodata_app::ports::{AlertRepository, TemperatureReadingRepository};
use thermodata_domain::alert::{Alert, AlertPatch};
use thermodata_domain::error::{NotFoundError, ThermoDataError};
use thermodata_domain::id::{AlertId, TemperatureReadingId};
use thermodata_domain::temperature_reading::{TemperatureReading, TemperatureReadingPatch};

use super::{ALERTS, TEMPERATURE_READINGS};
use crate::error::ApiError;
use crate::state::AppState;

/// A parsed `Set(id)` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKey {
    TemperatureReading(TemperatureReadingId),
    Alert(AlertId),
}

impl EntityKey {
    /// Parse a path segment of the form `Set(id)`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when the segment does not name a known
    /// entity set, and a bad request when the key itself is malformed.
    pub fn parse(segment: &str) -> Result<Self, ApiError> {
        let not_found = || {
            ApiError::from(ThermoDataError::from(NotFoundError {
                entity: "EntitySet",
                id: segment.to_string(),
            }))
        };

        let (set, rest) = segment.split_once('(').ok_or_else(not_found)?;
        if set != TEMPERATURE_READINGS && set != ALERTS {
            return Err(not_found());
        }
        let key = rest
            .strip_suffix(')')
            .ok_or_else(|| ApiError::BadRequest(format!("malformed key in '{segment}'")))?;
        let invalid = |_| ApiError::BadRequest(format!("invalid key '{key}' for {set}"));

        if set == TEMPERATURE_READINGS {
            key.parse().map(Self::TemperatureReading).map_err(invalid)
        } else {
            key.parse().map(Self::Alert).map_err(invalid)
        }
    }
}

/// Possible responses from the get and patch endpoints.
pub enum EntityResponse {
    TemperatureReading(Json<TemperatureReading>),
    Alert(Json<Alert>),
}

impl IntoResponse for EntityResponse {
    fn into_response(self) -> Response {
        match self {
            Self::TemperatureReading(json) => json.into_response(),
            Self::Alert(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /{Set}({id})`
pub async fn get<RR, AR>(
    State(state): State<AppState<RR, AR>>,
    Path(segment): Path<String>,
) -> Result<EntityResponse, ApiError>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    Ok(match EntityKey::parse(&segment)? {
        EntityKey::TemperatureReading(id) => {
            EntityResponse::TemperatureReading(Json(state.reading_service.get_reading(id).await?))
        }
        EntityKey::Alert(id) => EntityResponse::Alert(Json(state.alert_service.get_alert(id).await?)),
    })
}

/// `PATCH /{Set}({id})`
///
/// The body is decoded once the entity set is known, so unknown fields
/// are rejected against the right patch type.
pub async fn patch<RR, AR>(
    State(state): State<AppState<RR, AR>>,
    Path(segment): Path<String>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<EntityResponse, ApiError>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    let key = EntityKey::parse(&segment)?;
    let Json(body) = body?;
    Ok(match key {
        EntityKey::TemperatureReading(id) => {
            let patch: TemperatureReadingPatch = serde_json::from_value(body)?;
            EntityResponse::TemperatureReading(Json(
                state.reading_service.patch_reading(id, patch).await?,
            ))
        }
        EntityKey::Alert(id) => {
            let patch: AlertPatch = serde_json::from_value(body)?;
            EntityResponse::Alert(Json(state.alert_service.patch_alert(id, patch).await?))
        }
    })
}

/// `DELETE /{Set}({id})`
pub async fn delete<RR, AR>(
    State(state): State<AppState<RR, AR>>,
    Path(segment): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    RR: TemperatureReadingRepository + Send + Sync + 'static,
    AR: AlertRepository + Send + Sync + 'static,
{
    match EntityKey::parse(&segment)? {
        EntityKey::TemperatureReading(id) => state.reading_service.delete_reading(id).await?,
        EntityKey::Alert(id) => state.alert_service.delete_alert(id).await?,
    }
    Ok(DeleteResponse::NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(result: Result<EntityKey, ApiError>) -> StatusCode {
        result.unwrap_err().into_response().status()
    }

    #[test]
    fn should_parse_reading_key() {
        assert_eq!(
            EntityKey::parse("TemperatureReadings(12)").unwrap(),
            EntityKey::TemperatureReading(TemperatureReadingId::new(12))
        );
    }

    #[test]
    fn should_parse_alert_key() {
        assert_eq!(
            EntityKey::parse("Alerts(3)").unwrap(),
            EntityKey::Alert(AlertId::new(3))
        );
    }

    #[test]
    fn should_reject_unknown_entity_set_as_not_found() {
        assert_eq!(status(EntityKey::parse("Sensors(1)")), StatusCode::NOT_FOUND);
        assert_eq!(status(EntityKey::parse("favicon.ico")), StatusCode::NOT_FOUND);
    }

    #[test]
    fn should_reject_malformed_key_as_bad_request() {
        assert_eq!(status(EntityKey::parse("Alerts(abc)")), StatusCode::BAD_REQUEST);
        assert_eq!(status(EntityKey::parse("Alerts(3")), StatusCode::BAD_REQUEST);
        assert_eq!(status(EntityKey::parse("Alerts()")), StatusCode::BAD_REQUEST);
    }
}

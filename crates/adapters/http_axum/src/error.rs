//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use thermodata_domain::error::{FieldError, ThermoDataError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [FieldError]>,
}

impl ErrorBody<'_> {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// Maps request and [`ThermoDataError`] failures to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// A service call failed.
    Domain(ThermoDataError),
    /// The request could not be decoded (malformed key, body or query string).
    BadRequest(String),
}

impl From<ThermoDataError> for ApiError {
    fn from(err: ThermoDataError) -> Self {
        Self::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::BadRequest(message) => {
                return (StatusCode::BAD_REQUEST, Json(ErrorBody::message(message)))
                    .into_response();
            }
            Self::Domain(err) => err,
        };

        match &err {
            ThermoDataError::Validation(validation) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "validation failed".to_string(),
                    details: Some(&validation.errors),
                }),
            )
                .into_response(),
            ThermoDataError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            ThermoDataError::Query(query) => {
                tracing::debug!(error = %query, "rejected query options");
                (StatusCode::BAD_REQUEST, Json(ErrorBody::message(query.to_string())))
                    .into_response()
            }
            ThermoDataError::Storage(source) => {
                tracing::error!(error = %source, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::message("internal server error")),
                )
                    .into_response()
            }
        }
    }
}

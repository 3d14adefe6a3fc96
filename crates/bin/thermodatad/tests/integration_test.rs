//! End-to-end smoke tests for the full thermodatad stack.
//!
//! Each test spins up the complete application (in-memory `SQLite`, real repos,
//! real services, real axum router) and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot` — no TCP port is bound.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use thermodata_adapter_http_axum::router;
use thermodata_adapter_http_axum::state::AppState;
use thermodata_adapter_storage_sqlite_sqlx::{
    Config, SqliteAlertRepository, SqliteTemperatureReadingRepository,
};
use thermodata_app::services::alert_service::AlertService;
use thermodata_app::services::temperature_reading_service::TemperatureReadingService;
use thermodata_domain::query::{AllowedQueryOptions, QuerySettings};
use tower::ServiceExt;

/// Build a fully-wired router backed by an in-memory `SQLite` database.
async fn app_with(alert_settings: QuerySettings) -> axum::Router {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    let pool = db.pool().clone();

    let reading_repo = SqliteTemperatureReadingRepository::new(pool.clone());
    let alert_repo = SqliteAlertRepository::new(pool);

    let state = AppState::new(
        TemperatureReadingService::new(reading_repo.clone()),
        AlertService::new(alert_repo, reading_repo).with_query_settings(alert_settings),
    );

    router::build(state)
}

async fn app() -> axum::Router {
    app_with(QuerySettings::default()).await
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_reading(app: &axum::Router, temperature: f64) -> i64 {
    let response = send(
        app,
        "POST",
        "/TemperatureReadings",
        Some(json!({"measureDateTime": "2018-08-23T12:00:00Z", "temperature": temperature})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn create_alert(app: &axum::Router, message: &str, reading_id: i64) -> i64 {
    let response = send(
        app,
        "POST",
        "/Alerts",
        Some(json!({"message": message, "temperatureReadingId": reading_id})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn reading_temperatures(app: &axum::Router, query: &str) -> Vec<Value> {
    let response = send(app, "GET", &format!("/TemperatureReadings{query}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["value"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["temperature"].clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = send(&app().await, "GET", "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Temperature readings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_assign_unique_ids_and_location() {
    let app = app().await;
    let response = send(
        &app,
        "POST",
        "/TemperatureReadings",
        Some(json!({"id": 77, "measureDateTime": "2018-08-23T12:00:00Z", "temperature": 4.0})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
    let body = body_json(response).await;
    let id = body["id"].as_i64().unwrap();
    assert_ne!(id, 77);
    assert_eq!(location, format!("/TemperatureReadings({id})"));

    let other = create_reading(&app, 5.0).await;
    assert_ne!(other, id);

    let fetched = send(&app, "GET", &location, None).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await, body);
}

#[tokio::test]
async fn should_reject_reading_below_absolute_zero() {
    let app = app().await;
    let response = send(
        &app,
        "POST",
        "/TemperatureReadings",
        Some(json!({"measureDateTime": "2018-08-23T12:00:00Z", "temperature": -273.16})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation failed");
    assert_eq!(body["details"][0]["field"], "temperature");
    assert!(reading_temperatures(&app, "").await.is_empty());
}

#[tokio::test]
async fn should_report_every_missing_field() {
    let app = app().await;
    let response = send(&app, "POST", "/TemperatureReadings", Some(json!({}))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let fields: Vec<Value> = body_json(response).await["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].clone())
        .collect();
    assert_eq!(fields, vec![json!("measureDateTime"), json!("temperature")]);
}

#[tokio::test]
async fn should_filter_readings_in_store_order() {
    let app = app().await;
    for temperature in [10.0, 25.0, 30.0] {
        create_reading(&app, temperature).await;
    }

    let temperatures = reading_temperatures(&app, "?$filter=temperature%20gt%2020").await;
    assert_eq!(temperatures, vec![json!(25.0), json!(30.0)]);
}

#[tokio::test]
async fn should_return_second_element_for_top_one_skip_one() {
    let app = app().await;
    for temperature in [30.0, 10.0, 25.0] {
        create_reading(&app, temperature).await;
    }

    let temperatures =
        reading_temperatures(&app, "?$orderby=temperature&$top=1&$skip=1").await;
    assert_eq!(temperatures, vec![json!(25.0)]);
}

#[tokio::test]
async fn should_count_and_select_readings() {
    let app = app().await;
    for temperature in [10.0, 25.0, 30.0] {
        create_reading(&app, temperature).await;
    }

    let response = send(
        &app,
        "GET",
        "/TemperatureReadings?$count=true&$select=temperature&$top=2",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"@odata.count": 3, "value": [{"temperature": 10.0}, {"temperature": 25.0}]})
    );
}

#[tokio::test]
async fn should_reject_malformed_filter_and_unknown_field() {
    let app = app().await;
    create_reading(&app, 10.0).await;

    for query in ["?$filter=temperature%20gt", "?$filter=humidity%20gt%201", "?$orderby=humidity"] {
        let response = send(&app, "GET", &format!("/TemperatureReadings{query}"), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{query}");
        let body = body_json(response).await;
        assert!(body["error"].is_string());
        assert!(body.get("value").is_none());
    }
}

#[tokio::test]
async fn should_reject_deeply_nested_filter_with_bad_request() {
    let app = app().await;
    create_reading(&app, 10.0).await;

    let filter = format!(
        "{}id%20eq%201{}",
        "(".repeat(5_000),
        ")".repeat(5_000)
    );
    let response = send(
        &app,
        "GET",
        &format!("/TemperatureReadings?$filter={filter}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, "GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_patch_only_supplied_reading_fields() {
    let app = app().await;
    let id = create_reading(&app, 10.0).await;

    let response = send(
        &app,
        "PATCH",
        &format!("/TemperatureReadings({id})"),
        Some(json!({"temperature": 12.5})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"id": id, "measureDateTime": "2018-08-23T12:00:00Z", "temperature": 12.5})
    );
}

#[tokio::test]
async fn should_reject_id_in_patch() {
    let app = app().await;
    let id = create_reading(&app, 10.0).await;

    let response = send(
        &app,
        "PATCH",
        &format!("/TemperatureReadings({id})"),
        Some(json!({"id": 99})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_return_not_found_for_missing_id_without_side_effects() {
    let app = app().await;
    create_reading(&app, 10.0).await;

    let get = send(&app, "GET", "/TemperatureReadings(9999)", None).await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);

    let patch = send(
        &app,
        "PATCH",
        "/TemperatureReadings(9999)",
        Some(json!({"temperature": 1.0})),
    )
    .await;
    assert_eq!(patch.status(), StatusCode::NOT_FOUND);

    let delete = send(&app, "DELETE", "/Alerts(9999)", None).await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    assert_eq!(reading_temperatures(&app, "").await, vec![json!(10.0)]);
}

#[tokio::test]
async fn should_reject_malformed_key() {
    let resp = send(&app().await, "GET", "/TemperatureReadings(abc)", None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_return_not_found_for_unknown_entity_set() {
    let resp = send(&app().await, "GET", "/Sensors(1)", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_delete_alerts_with_their_reading() {
    let app = app().await;
    let reading = create_reading(&app, -20.0).await;
    let alert = create_alert(&app, "freezer door open", reading).await;

    let delete = send(&app, "DELETE", &format!("/TemperatureReadings({reading})"), None).await;
    assert_eq!(delete.status(), StatusCode::NO_CONTENT);

    let get = send(&app, "GET", &format!("/Alerts({alert})"), None).await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_keep_reading_reference_when_patching_message() {
    let app = app().await;
    let reading = create_reading(&app, 8.0).await;
    let alert = create_alert(&app, "old", reading).await;

    let response = send(
        &app,
        "PATCH",
        &format!("/Alerts({alert})"),
        Some(json!({"message": "new"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"id": alert, "message": "new", "temperatureReadingId": reading})
    );
}

#[tokio::test]
async fn should_reject_alert_for_missing_reading() {
    let app = app().await;
    let response = send(
        &app,
        "POST",
        "/Alerts",
        Some(json!({"message": "orphan", "temperatureReadingId": 42})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["details"][0]["field"],
        "temperatureReadingId"
    );
}

#[tokio::test]
async fn should_reject_overlong_alert_message() {
    let app = app().await;
    let reading = create_reading(&app, 8.0).await;
    let response = send(
        &app,
        "POST",
        "/Alerts",
        Some(json!({"message": "x".repeat(251), "temperatureReadingId": reading})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["details"][0]["field"], "message");
}

#[tokio::test]
async fn should_reject_count_on_alerts_but_accept_on_readings() {
    let app = app().await;

    let alerts = send(&app, "GET", "/Alerts?$count=true", None).await;
    assert_eq!(alerts.status(), StatusCode::BAD_REQUEST);

    let readings = send(&app, "GET", "/TemperatureReadings?$count=true", None).await;
    assert_eq!(readings.status(), StatusCode::OK);
    assert_eq!(body_json(readings).await["@odata.count"], 0);
}

#[tokio::test]
async fn should_inline_reading_when_expand_enabled() {
    let app = app_with(QuerySettings {
        allowed: AllowedQueryOptions::all(),
        ..QuerySettings::default()
    })
    .await;
    let reading = create_reading(&app, 31.5).await;
    create_alert(&app, "too hot", reading).await;

    let response = send(&app, "GET", "/Alerts?$expand=temperatureReading", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["value"][0]["temperatureReading"],
        json!({"id": reading, "measureDateTime": "2018-08-23T12:00:00Z", "temperature": 31.5})
    );
}

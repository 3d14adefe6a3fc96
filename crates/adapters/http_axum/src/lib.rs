//! # thermodata-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the two entity sets with OData-style URL conventions
//!   (`/TemperatureReadings`, `/Alerts(3)`, `?$filter=…`)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into JSON responses
//!
//! ## Dependency rule
//! Depends on `thermodata-app` (for port traits and services) and
//! `thermodata-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

//! # thermodata-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `TemperatureReadingRepository` — CRUD for readings
//!   - `AlertRepository` — CRUD for alerts
//! - Define **driving/inbound ports** as use-case structs:
//!   - `TemperatureReadingService` — list (with query options), get, create, patch, delete
//!   - `AlertService` — the same, plus reference checks and `$expand` resolution
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `thermodata-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;

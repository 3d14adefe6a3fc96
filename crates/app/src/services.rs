//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod alert_service;
pub mod temperature_reading_service;

use thermodata_domain::query::{Page, Record};

/// A projected page ready to be serialized.
pub type RecordPage = Page<Record>;

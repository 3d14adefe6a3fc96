//! # thermodata-domain
//!
//! Pure domain model for the thermodata service.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Temperature readings** (a measured temperature at a point in time)
//! - Define **Alerts** (messages attached to a reading)
//! - Define **merge patches** for partial updates
//! - Provide the **query translator**: parse `$filter`, `$orderby`,
//!   `$select`, `$expand`, `$top`, `$skip` and `$count` and apply them to
//!   any collection of [`query::Queryable`] entities
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod patch;
pub mod time;

pub mod alert;
pub mod query;
pub mod temperature_reading;

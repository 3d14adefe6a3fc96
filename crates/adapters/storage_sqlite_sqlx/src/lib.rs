//! # thermodata-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `thermodata-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `thermodata-app` (for port traits) and `thermodata-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod alert_repo;
mod error;
mod pool;
mod temperature_reading_repo;

pub use alert_repo::SqliteAlertRepository;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use temperature_reading_repo::SqliteTemperatureReadingRepository;

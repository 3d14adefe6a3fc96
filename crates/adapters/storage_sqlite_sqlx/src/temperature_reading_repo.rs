//! `SQLite` implementation of [`TemperatureReadingRepository`].

use std::future::Future;

use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use thermodata_app::ports::TemperatureReadingRepository;
use thermodata_domain::error::{NotFoundError, ThermoDataError};
use thermodata_domain::id::TemperatureReadingId;
use thermodata_domain::temperature_reading::{NewTemperatureReading, TemperatureReading};
use thermodata_domain::time::Timestamp;

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`TemperatureReading`].
struct Wrapper(TemperatureReading);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("TemperatureReadingId")?;
        let measured: String = row.try_get("MeasureDateTime")?;
        let temperature: f64 = row.try_get("Temperature")?;

        let measure_date_time = chrono::DateTime::parse_from_rfc3339(&measured)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(TemperatureReading {
            id: TemperatureReadingId::new(id),
            measure_date_time,
            temperature,
        }))
    }
}

fn encode_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

const INSERT: &str = "INSERT INTO TemperatureReadings (MeasureDateTime, Temperature) VALUES (?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM TemperatureReadings WHERE TemperatureReadingId = ?";
const SELECT_ALL: &str = "SELECT * FROM TemperatureReadings ORDER BY TemperatureReadingId";
const UPDATE: &str = r"
    UPDATE TemperatureReadings
    SET MeasureDateTime = ?, Temperature = ?
    WHERE TemperatureReadingId = ?
";
const DELETE_BY_ID: &str = "DELETE FROM TemperatureReadings WHERE TemperatureReadingId = ?";

/// `SQLite`-backed temperature reading repository.
#[derive(Clone)]
pub struct SqliteTemperatureReadingRepository {
    pool: SqlitePool,
}

impl SqliteTemperatureReadingRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TemperatureReadingRepository for SqliteTemperatureReadingRepository {
    fn create(
        &self,
        reading: NewTemperatureReading,
    ) -> impl Future<Output = Result<TemperatureReading, ThermoDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(encode_timestamp(&reading.measure_date_time))
                .bind(reading.temperature)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(reading.with_id(TemperatureReadingId::new(result.last_insert_rowid())))
        }
    }

    fn get_by_id(
        &self,
        id: TemperatureReadingId,
    ) -> impl Future<Output = Result<Option<TemperatureReading>, ThermoDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(row.map(|w| w.0))
        }
    }

    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<TemperatureReading>, ThermoDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        reading: TemperatureReading,
    ) -> impl Future<Output = Result<TemperatureReading, ThermoDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(UPDATE)
                .bind(encode_timestamp(&reading.measure_date_time))
                .bind(reading.temperature)
                .bind(reading.id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "TemperatureReading",
                    id: reading.id.to_string(),
                }
                .into());
            }
            Ok(reading)
        }
    }

    fn delete(
        &self,
        id: TemperatureReadingId,
    ) -> impl Future<Output = Result<bool, ThermoDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}

//! `SQLite` implementation of [`AlertRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use thermodata_app::ports::AlertRepository;
use thermodata_domain::alert::{Alert, NewAlert};
use thermodata_domain::error::{NotFoundError, ThermoDataError};
use thermodata_domain::id::{AlertId, TemperatureReadingId};

use crate::error::{StorageError, map_reference_error};

/// Wrapper for converting database rows into domain [`Alert`].
struct Wrapper(Alert);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Alert {
            id: AlertId::new(row.try_get("AlertId")?),
            message: row.try_get("Message")?,
            temperature_reading_id: TemperatureReadingId::new(
                row.try_get("TemperatureReadingId")?,
            ),
        }))
    }
}

const INSERT: &str = "INSERT INTO Alerts (Message, TemperatureReadingId) VALUES (?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM Alerts WHERE AlertId = ?";
const SELECT_ALL: &str = "SELECT * FROM Alerts ORDER BY AlertId";
const UPDATE: &str = "UPDATE Alerts SET Message = ?, TemperatureReadingId = ? WHERE AlertId = ?";
const DELETE_BY_ID: &str = "DELETE FROM Alerts WHERE AlertId = ?";

/// `SQLite`-backed alert repository.
#[derive(Clone)]
pub struct SqliteAlertRepository {
    pool: SqlitePool,
}

impl SqliteAlertRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AlertRepository for SqliteAlertRepository {
    fn create(&self, alert: NewAlert) -> impl Future<Output = Result<Alert, ThermoDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(INSERT)
                .bind(&alert.message)
                .bind(alert.temperature_reading_id.get())
                .execute(&pool)
                .await
                .map_err(map_reference_error)?;

            Ok(alert.with_id(AlertId::new(result.last_insert_rowid())))
        }
    }

    fn get_by_id(
        &self,
        id: AlertId,
    ) -> impl Future<Output = Result<Option<Alert>, ThermoDataError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Alert>, ThermoDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, alert: Alert) -> impl Future<Output = Result<Alert, ThermoDataError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(UPDATE)
                .bind(&alert.message)
                .bind(alert.temperature_reading_id.get())
                .bind(alert.id.get())
                .execute(&pool)
                .await
                .map_err(map_reference_error)?;

            if result.rows_affected() == 0 {
                return Err(NotFoundError {
                    entity: "Alert",
                    id: alert.id.to_string(),
                }
                .into());
            }
            Ok(alert)
        }
    }

    fn delete(&self, id: AlertId) -> impl Future<Output = Result<bool, ThermoDataError>> + Send {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use crate::temperature_reading_repo::SqliteTemperatureReadingRepository;
    use thermodata_app::ports::TemperatureReadingRepository;
    use thermodata_domain::temperature_reading::NewTemperatureReading;

    async fn setup() -> (SqliteAlertRepository, SqliteTemperatureReadingRepository) {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        (
            SqliteAlertRepository::new(db.pool().clone()),
            SqliteTemperatureReadingRepository::new(db.pool().clone()),
        )
    }

    async fn seed_reading(readings: &SqliteTemperatureReadingRepository) -> TemperatureReadingId {
        readings
            .create(NewTemperatureReading {
                measure_date_time: "2018-08-23T12:00:00Z".parse().unwrap(),
                temperature: 4.5,
            })
            .await
            .unwrap()
            .id
    }

    fn new_alert(message: &str, reading: TemperatureReadingId) -> NewAlert {
        NewAlert {
            message: message.to_string(),
            temperature_reading_id: reading,
        }
    }

    #[tokio::test]
    async fn should_create_and_get_alert() {
        let (repo, readings) = setup().await;
        let reading = seed_reading(&readings).await;

        let created = repo.create(new_alert("door open", reading)).await.unwrap();
        let found = repo.get_by_id(created.id).await.unwrap();

        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn should_reject_dangling_reading_reference_as_validation_error() {
        let (repo, _) = setup().await;
        let result = repo
            .create(new_alert("orphan", TemperatureReadingId::new(99)))
            .await;

        match result {
            Err(ThermoDataError::Validation(err)) => {
                assert_eq!(err.errors[0].field, "temperatureReadingId");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_update_alert() {
        let (repo, readings) = setup().await;
        let first = seed_reading(&readings).await;
        let second = seed_reading(&readings).await;
        let mut alert = repo.create(new_alert("before", first)).await.unwrap();

        alert.message = "after".to_string();
        alert.temperature_reading_id = second;
        repo.update(alert.clone()).await.unwrap();

        assert_eq!(repo.get_by_id(alert.id).await.unwrap(), Some(alert));
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_deleted_alert() {
        let (repo, readings) = setup().await;
        let reading = seed_reading(&readings).await;
        let alert = repo.create(new_alert("msg", reading)).await.unwrap();
        assert!(repo.delete(alert.id).await.unwrap());

        let result = repo.update(alert).await;
        assert!(matches!(result, Err(ThermoDataError::NotFound(_))));
        assert!(repo.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_list_alerts_in_id_order() {
        let (repo, readings) = setup().await;
        let reading = seed_reading(&readings).await;
        for message in ["c", "a", "b"] {
            repo.create(new_alert(message, reading)).await.unwrap();
        }

        let messages: Vec<String> = repo
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.message)
            .collect();
        assert_eq!(messages, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn should_delete_alerts_with_their_reading() {
        let (repo, readings) = setup().await;
        let kept = seed_reading(&readings).await;
        let removed = seed_reading(&readings).await;
        let survivor = repo.create(new_alert("kept", kept)).await.unwrap();
        repo.create(new_alert("gone", removed)).await.unwrap();

        assert!(readings.delete(removed).await.unwrap());

        assert_eq!(repo.get_all().await.unwrap(), vec![survivor]);
    }

    #[tokio::test]
    async fn should_report_whether_alert_was_deleted() {
        let (repo, readings) = setup().await;
        let reading = seed_reading(&readings).await;
        let alert = repo.create(new_alert("msg", reading)).await.unwrap();

        assert!(repo.delete(alert.id).await.unwrap());
        assert!(!repo.delete(alert.id).await.unwrap());
    }
}

// src/db/location_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::location::{Location, LocationStatus},
};

const LOCATION_COLUMNS: &str = "city, areas, status, created_at, updated_at";

#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Location>, AppError> {
        let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations ORDER BY city ASC");
        let locations = sqlx::query_as::<_, Location>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(locations)
    }

    // Status NULL = registro antigo, conta como habilitado.
    pub async fn list_enabled(&self) -> Result<Vec<Location>, AppError> {
        let sql = format!(
            "SELECT {LOCATION_COLUMNS} FROM locations \
             WHERE status IS NULL OR status = 'enabled' ORDER BY city ASC"
        );
        let locations = sqlx::query_as::<_, Location>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(locations)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        city: &str,
        areas: &[String],
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO locations (city, areas, status) VALUES ($1, $2, 'enabled') \
             RETURNING {LOCATION_COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&sql)
            .bind(city)
            .bind(areas)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::LocationAlreadyExists(city.to_string());
                    }
                }
                e.into()
            })
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        city: &str,
        new_city: &str,
        areas: &[String],
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE locations SET city = $2, areas = $3, updated_at = NOW() \
             WHERE city = $1 RETURNING {LOCATION_COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&sql)
            .bind(city)
            .bind(new_city)
            .bind(areas)
            .fetch_optional(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return AppError::LocationAlreadyExists(new_city.to_string());
                    }
                }
                e.into()
            })
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        city: &str,
        status: LocationStatus,
    ) -> Result<Option<Location>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE locations SET status = $2, updated_at = NOW() \
             WHERE city = $1 RETURNING {LOCATION_COLUMNS}"
        );
        let location = sqlx::query_as::<_, Location>(&sql)
            .bind(city)
            .bind(status)
            .fetch_optional(executor)
            .await?;
        Ok(location)
    }

    pub async fn delete<'e, E>(&self, executor: E, city: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM locations WHERE city = $1")
            .bind(city)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

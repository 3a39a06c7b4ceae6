// src/services/location_service.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::LocationRepository,
    models::location::{normalize_areas, Location, LocationStatus},
};

#[derive(Clone)]
pub struct LocationService {
    repo: LocationRepository,
}

impl LocationService {
    pub fn new(repo: LocationRepository) -> Self {
        Self { repo }
    }

    // Admin vê todas; o público só as habilitadas.
    pub async fn list(&self, include_disabled: bool) -> Result<Vec<Location>, AppError> {
        if include_disabled {
            self.repo.list_all().await
        } else {
            self.repo.list_enabled().await
        }
    }

    pub async fn list_enabled(&self) -> Result<Vec<Location>, AppError> {
        self.repo.list_enabled().await
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        city: &str,
        areas: Vec<String>,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let city = required_city(city)?;
        let location = self
            .repo
            .create(executor, city, &normalize_areas(areas))
            .await?;
        tracing::info!("📍 Cidade '{}' cadastrada", location.city);
        Ok(location)
    }

    /// Substitui os bairros e, opcionalmente, renomeia a cidade.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        city: &str,
        new_city: Option<&str>,
        areas: Vec<String>,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let city = required_city(city)?;
        let target = match new_city.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => city,
        };

        self.repo
            .update(executor, city, target, &normalize_areas(areas))
            .await?
            .ok_or_else(|| AppError::LocationNotFound(city.to_string()))
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        city: &str,
        status: LocationStatus,
    ) -> Result<Location, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let city = required_city(city)?;
        self.repo
            .set_status(executor, city, status)
            .await?
            .ok_or_else(|| AppError::LocationNotFound(city.to_string()))
    }

    pub async fn delete<'e, E>(&self, executor: E, city: &str) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let city = required_city(city)?;
        if !self.repo.delete(executor, city).await? {
            return Err(AppError::LocationNotFound(city.to_string()));
        }
        tracing::info!("📍 Cidade '{}' removida", city);
        Ok(())
    }
}

fn required_city(city: &str) -> Result<&str, AppError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(AppError::InvalidArgument("city".into()));
    }
    Ok(city)
}

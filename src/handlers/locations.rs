// src/handlers/locations.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AdminSession, MaybeAdmin},
        i18n::Locale,
    },
    models::location::{
        CreateLocationPayload, Location, LocationKey, SetLocationStatusPayload,
        UpdateLocationPayload,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteLocationResponse {
    pub success: bool,
    pub city: String,
}

// GET /api/locations
// Visitante só vê cidades habilitadas; o admin vê todas.
#[utoipa::path(
    get,
    path = "/api/locations",
    tag = "Locations",
    responses(
        (status = 200, description = "Cidades e bairros", body = [Location])
    )
)]
pub async fn list_locations(
    State(app_state): State<AppState>,
    locale: Locale,
    session: MaybeAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let locations = app_state
        .location_service
        .list(session.is_admin())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(locations))
}

#[utoipa::path(
    get,
    path = "/api/locations/enabled",
    tag = "Locations",
    responses(
        (status = 200, description = "Cidades habilitadas", body = [Location])
    )
)]
pub async fn list_enabled_locations(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let locations = app_state
        .location_service
        .list_enabled()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(locations))
}

#[utoipa::path(
    post,
    path = "/api/locations",
    tag = "Locations",
    request_body = CreateLocationPayload,
    responses(
        (status = 201, description = "Cidade cadastrada", body = Location),
        (status = 409, description = "Cidade já existe")
    ),
    security(("admin_jwt" = []))
)]
pub async fn create_location(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<CreateLocationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let location = app_state
        .location_service
        .create(&app_state.db_pool, &payload.city, payload.areas)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(location)))
}

#[utoipa::path(
    put,
    path = "/api/locations",
    tag = "Locations",
    request_body = UpdateLocationPayload,
    responses(
        (status = 200, description = "Cidade atualizada", body = Location),
        (status = 404, description = "Cidade não encontrada"),
        (status = 409, description = "Novo nome já existe")
    ),
    security(("admin_jwt" = []))
)]
pub async fn update_location(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<UpdateLocationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let location = app_state
        .location_service
        .update(
            &app_state.db_pool,
            &payload.city,
            payload.new_city.as_deref(),
            payload.areas,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(location))
}

#[utoipa::path(
    patch,
    path = "/api/locations",
    tag = "Locations",
    request_body = SetLocationStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = Location),
        (status = 404, description = "Cidade não encontrada")
    ),
    security(("admin_jwt" = []))
)]
pub async fn set_location_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<SetLocationStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let location = app_state
        .location_service
        .set_status(&app_state.db_pool, &payload.city, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(location))
}

#[utoipa::path(
    delete,
    path = "/api/locations",
    tag = "Locations",
    params(LocationKey),
    responses(
        (status = 200, description = "Cidade removida", body = DeleteLocationResponse),
        (status = 404, description = "Cidade não encontrada")
    ),
    security(("admin_jwt" = []))
)]
pub async fn delete_location(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Query(key): Query<LocationKey>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .location_service
        .delete(&app_state.db_pool, &key.city)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(DeleteLocationResponse {
        success: true,
        city: key.city.trim().to_string(),
    }))
}

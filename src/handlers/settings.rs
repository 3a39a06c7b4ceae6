// src/handlers/settings.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AdminSession, i18n::Locale},
    models::settings::{AiAvailability, AiSettings, SiteSettings, UpdateAiSettingsRequest, UpdateSiteSettingsRequest},
};

// GET /api/site-settings (público)
#[utoipa::path(
    get,
    path = "/api/site-settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Configurações do site", body = SiteSettings)
    )
)]
pub async fn get_site_settings(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .site_settings
        .get()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(settings))
}

// POST /api/site-settings
#[utoipa::path(
    post,
    path = "/api/site-settings",
    tag = "Settings",
    request_body = UpdateSiteSettingsRequest,
    responses(
        (status = 200, description = "Configurações salvas", body = SiteSettings)
    ),
    security(("admin_jwt" = []))
)]
pub async fn update_site_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<UpdateSiteSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .site_settings
        .update(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}

#[utoipa::path(
    get,
    path = "/api/admin/ai-settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Recursos de IA, limites e uso atual", body = AiSettings)
    ),
    security(("admin_jwt" = []))
)]
pub async fn get_ai_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let settings = app_state
        .ai_settings
        .get()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/api/admin/ai-settings",
    tag = "Settings",
    request_body = UpdateAiSettingsRequest,
    responses(
        (status = 200, description = "Configurações de IA salvas", body = AiSettings),
        (status = 400, description = "Limite negativo")
    ),
    security(("admin_jwt" = []))
)]
pub async fn update_ai_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<UpdateAiSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .ai_settings
        .update(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}

// GET /api/ai-availability (público)
#[utoipa::path(
    get,
    path = "/api/ai-availability",
    tag = "Settings",
    responses(
        (status = 200, description = "Disponibilidade de cada recurso de IA", body = AiAvailability)
    )
)]
pub async fn get_ai_availability(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let availability = app_state
        .ai_settings
        .availability()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(availability))
}

// src/handlers/ai.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::ai::{GenerateContentRequest, GenerateImageRequest, GeneratedContent, GeneratedImage},
};

// Rotas públicas: o formulário de submissão também gera conteúdo.
// O controle de custo fica com as chaves de recurso e a cota.

#[utoipa::path(
    post,
    path = "/api/generate-content",
    tag = "AI",
    request_body = GenerateContentRequest,
    responses(
        (status = 200, description = "Texto gerado", body = GeneratedContent),
        (status = 403, description = "Recurso desabilitado"),
        (status = 429, description = "Cota diária ou mensal esgotada"),
        (status = 502, description = "Falha no provedor de IA")
    )
)]
pub async fn generate_content(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<GenerateContentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let content = app_state
        .ai_service
        .generate_content(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(GeneratedContent { content }))
}

#[utoipa::path(
    post,
    path = "/api/generate-image",
    tag = "AI",
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "URL da imagem gerada", body = GeneratedImage),
        (status = 403, description = "Recurso desabilitado"),
        (status = 429, description = "Cota diária ou mensal esgotada"),
        (status = 502, description = "Falha no provedor de IA")
    )
)]
pub async fn generate_image(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<GenerateImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let image_url = app_state
        .ai_service
        .generate_image(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(GeneratedImage { image_url }))
}

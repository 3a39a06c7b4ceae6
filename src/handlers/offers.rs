// src/handlers/offers.rs

use axum::{
    extract::{Path, Query, State},
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
    middleware::{auth::AdminSession, i18n::Locale},
    models::offer::{NewOffer, Offer, OfferQuery, SweepReport, UpdateOfferRequest},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteOfferResponse {
    pub success: bool,
    pub id: i64,
}

// GET /api/offers (público)
#[utoipa::path(
    get,
    path = "/api/offers",
    tag = "Offers",
    params(OfferQuery),
    responses(
        (status = 200, description = "Ofertas vigentes, mais recentes primeiro", body = [Offer])
    )
)]
pub async fn list_offers(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<OfferQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let offers = app_state
        .offer_service
        .list_active(query)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(offers))
}

#[utoipa::path(
    post,
    path = "/api/offers",
    tag = "Offers",
    request_body = NewOffer,
    responses(
        (status = 201, description = "Oferta criada", body = Offer),
        (status = 400, description = "Dados inválidos")
    ),
    security(("admin_jwt" = []))
)]
pub async fn create_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<NewOffer>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let offer = app_state
        .offer_service
        .create(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(offer)))
}

#[utoipa::path(
    put,
    path = "/api/offers",
    tag = "Offers",
    request_body = UpdateOfferRequest,
    responses(
        (status = 200, description = "Oferta atualizada", body = Offer),
        (status = 404, description = "Oferta não encontrada")
    ),
    security(("admin_jwt" = []))
)]
pub async fn update_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<UpdateOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let offer = app_state
        .offer_service
        .update(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(offer))
}

#[utoipa::path(
    delete,
    path = "/api/offers/{id}",
    tag = "Offers",
    params(
        ("id" = i64, Path, description = "Id da oferta")
    ),
    responses(
        (status = 200, description = "Oferta removida", body = DeleteOfferResponse),
        (status = 400, description = "Id inválido"),
        (status = 404, description = "Oferta não encontrada")
    ),
    security(("admin_jwt" = []))
)]
pub async fn delete_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| to_api(AppError::InvalidArgument("id".into())))?;

    app_state
        .offer_service
        .delete(&app_state.db_pool, id)
        .await
        .map_err(to_api)?;

    Ok(Json(DeleteOfferResponse { success: true, id }))
}

// Limpeza explícita das ofertas vencidas
#[utoipa::path(
    post,
    path = "/api/admin/offers/sweep-expired",
    tag = "Offers",
    responses(
        (status = 200, description = "Ofertas vencidas removidas", body = SweepReport)
    ),
    security(("admin_jwt" = []))
)]
pub async fn sweep_expired_offers(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .offer_service
        .sweep_expired(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(report))
}

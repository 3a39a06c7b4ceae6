// src/handlers/submissions.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AdminSession, i18n::Locale},
    models::submission::{NewSubmission, Submission, SubmissionAction, SubmissionFilter, SubmissionPatch},
    services::{
        export_service::{DateRange, XLSX_CONTENT_TYPE},
        submission_service::ActionOutcome,
    },
};

// ---
// Payloads e respostas
// ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub inserted_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditSubmissionPayload {
    pub id: Option<String>,

    #[serde(flatten)]
    pub patch: SubmissionPatch,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmissionActionPayload {
    pub id: Option<String>,

    #[schema(example = "approve")]
    pub action: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<i64>,
    // Repetição de uma ação já aplicada
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub already_processed: bool,
}

impl From<ActionOutcome> for ActionResponse {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Approved {
                offer_id,
                promoted_now,
            } => Self {
                success: true,
                approved: Some(true),
                rejected: None,
                offer_id,
                already_processed: !promoted_now,
            },
            ActionOutcome::Rejected { rejected_now } => Self {
                success: true,
                approved: None,
                rejected: Some(true),
                offer_id: None,
                already_processed: !rejected_now,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub success: bool,
    pub deleted_count: u64,
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// AAAA-MM-DD
    pub date_from: Option<String>,
    /// AAAA-MM-DD
    pub date_to: Option<String>,
}

fn parse_id(raw: Option<&str>) -> Result<Uuid, AppError> {
    raw.map(str::trim)
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| AppError::InvalidArgument("id".into()))
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/api/submit-offer",
    tag = "Submissions",
    request_body = NewSubmission,
    responses(
        (status = 201, description = "Submissão recebida", body = SubmitResponse),
        (status = 400, description = "Descrição acima do limite de palavras")
    )
)]
pub async fn submit_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<NewSubmission>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let inserted_id = app_state
        .submission_service
        .submit(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            inserted_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/submissions",
    tag = "Submissions",
    params(SubmissionFilter),
    responses(
        (status = 200, description = "Submissões, mais recentes primeiro", body = [Submission]),
        (status = 401, description = "Sessão ausente ou inválida")
    ),
    security(("admin_jwt" = []))
)]
pub async fn list_submissions(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Query(filter): Query<SubmissionFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let submissions = app_state
        .submission_service
        .list(&filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(submissions))
}

#[utoipa::path(
    patch,
    path = "/api/submissions",
    tag = "Submissions",
    request_body = EditSubmissionPayload,
    responses(
        (status = 200, description = "Submissão atualizada", body = MessageResponse),
        (status = 400, description = "Id inválido ou nenhum campo editável"),
        (status = 404, description = "Submissão não encontrada")
    ),
    security(("admin_jwt" = []))
)]
pub async fn edit_submission(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<EditSubmissionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = parse_id(payload.id.as_deref()).map_err(to_api)?;
    payload
        .patch
        .validate()
        .map_err(|e| to_api(AppError::ValidationError(e)))?;
    if payload.patch.is_empty() {
        return Err(to_api(AppError::InvalidArgument("fields".into())));
    }

    app_state
        .submission_service
        .edit(&app_state.db_pool, id, &payload.patch)
        .await
        .map_err(to_api)?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Submission updated".into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/submissions",
    tag = "Submissions",
    request_body = SubmissionActionPayload,
    responses(
        (status = 200, description = "Aprovada (com o id da oferta) ou rejeitada", body = ActionResponse),
        (status = 400, description = "Id ou ação inválidos"),
        (status = 404, description = "Submissão não encontrada"),
        (status = 409, description = "Transição de status não permitida")
    ),
    security(("admin_jwt" = []))
)]
pub async fn moderate_submission(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Json(payload): Json<SubmissionActionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let id = parse_id(payload.id.as_deref()).map_err(to_api)?;
    let action = payload
        .action
        .as_deref()
        .ok_or_else(|| AppError::InvalidArgument("action".into()))
        .and_then(SubmissionAction::parse)
        .map_err(to_api)?;

    let outcome = app_state
        .submission_service
        .apply_action(&app_state.db_pool, id, action)
        .await
        .map_err(to_api)?;

    Ok(Json(ActionResponse::from(outcome)))
}

#[utoipa::path(
    delete,
    path = "/api/submissions",
    tag = "Submissions",
    responses(
        (status = 200, description = "Todas as submissões apagadas", body = ClearResponse)
    ),
    security(("admin_jwt" = []))
)]
pub async fn clear_submissions(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let deleted_count = app_state
        .submission_service
        .clear_all(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ClearResponse {
        success: true,
        deleted_count,
        message: format!("{deleted_count} submissions deleted"),
    }))
}

#[utoipa::path(
    get,
    path = "/api/download-submissions",
    tag = "Submissions",
    params(ExportQuery),
    responses(
        (status = 200, description = "Planilha .xlsx das submissões aprovadas",
            content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Data fora do formato AAAA-MM-DD")
    ),
    security(("admin_jwt" = []))
)]
pub async fn download_submissions(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminSession,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let range =
        DateRange::parse(query.date_from.as_deref(), query.date_to.as_deref()).map_err(to_api)?;

    let file = app_state
        .export_service
        .export_approved(range)
        .await
        .map_err(to_api)?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_uuids() {
        assert!(parse_id(Some("abc")).is_err());
        assert!(parse_id(None).is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_id(Some(&id.to_string())).unwrap(), id);
    }

    #[test]
    fn edit_payload_keeps_only_allowed_fields() {
        let payload: EditSubmissionPayload = serde_json::from_value(serde_json::json!({
            "id": "b7f3c1a4-7f4e-4c41-9a55-1d7c7d1b2f10",
            "title": "Novo título",
            "status": "approved",
            "city": null
        }))
        .unwrap();
        assert_eq!(payload.patch.title.as_deref(), Some("Novo título"));
        assert!(payload.patch.city.is_none());
    }

    #[test]
    fn approval_response_shape() {
        let body = serde_json::to_value(ActionResponse::from(ActionOutcome::Approved {
            offer_id: Some(7),
            promoted_now: true,
        }))
        .unwrap();
        assert_eq!(body, serde_json::json!({ "success": true, "approved": true, "offerId": 7 }));

        let body = serde_json::to_value(ActionResponse::from(ActionOutcome::Rejected {
            rejected_now: false,
        }))
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": true, "rejected": true, "alreadyProcessed": true })
        );
    }
}

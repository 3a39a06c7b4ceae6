// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::settings::{AiFeature, QuotaWindow},
};

// Erro de domínio. Cada variante tem um código que o I18nStore traduz.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Argumento inválido: {0}")]
    InvalidArgument(String),

    #[error("Ação desconhecida: {0}")]
    UnknownAction(String),

    #[error("Data inválida: {0}")]
    InvalidDate(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Sessão ausente")]
    MissingSession,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Submissão não encontrada")]
    SubmissionNotFound,

    #[error("Oferta não encontrada")]
    OfferNotFound,

    #[error("Cidade não encontrada: {0}")]
    LocationNotFound(String),

    #[error("Cidade já existe: {0}")]
    LocationAlreadyExists(String),

    #[error("Transição inválida: {from} -> {action}")]
    InvalidStatusTransition { from: String, action: String },

    #[error("Recurso de IA desabilitado: {0}")]
    AiFeatureDisabled(AiFeature),

    #[error("Cota de IA esgotada ({0})")]
    AiQuotaExceeded(QuotaWindow),

    #[error("Provedor de IA não configurado")]
    AiNotConfigured,

    #[error("Falha no provedor externo: {0}")]
    Upstream(String),

    #[error("Falha na chamada HTTP: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de planilha: {0}")]
    SpreadsheetError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // `anyhow::Error` captura o contexto de falhas inesperadas.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Código estável usado como chave de tradução.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::InvalidArgument(_) => "invalid_argument",
            AppError::UnknownAction(_) => "unknown_action",
            AppError::InvalidDate(_) => "invalid_date",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::MissingSession => "missing_session",
            AppError::InvalidToken => "invalid_token",
            AppError::Forbidden => "forbidden",
            AppError::SubmissionNotFound => "submission_not_found",
            AppError::OfferNotFound => "offer_not_found",
            AppError::LocationNotFound(_) => "location_not_found",
            AppError::LocationAlreadyExists(_) => "location_already_exists",
            AppError::InvalidStatusTransition { .. } => "invalid_status_transition",
            AppError::AiFeatureDisabled(_) => "ai_feature_disabled",
            AppError::AiQuotaExceeded(QuotaWindow::Daily) => "ai_daily_quota_exceeded",
            AppError::AiQuotaExceeded(QuotaWindow::Monthly) => "ai_monthly_quota_exceeded",
            AppError::AiNotConfigured => "ai_not_configured",
            AppError::Upstream(_) | AppError::HttpClientError(_) => "upstream_failure",
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidArgument(_)
            | AppError::UnknownAction(_)
            | AppError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::MissingSession | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::AiFeatureDisabled(_) => StatusCode::FORBIDDEN,
            AppError::SubmissionNotFound
            | AppError::OfferNotFound
            | AppError::LocationNotFound(_) => StatusCode::NOT_FOUND,
            AppError::LocationAlreadyExists(_) | AppError::InvalidStatusTransition { .. } => {
                StatusCode::CONFLICT
            }
            AppError::AiQuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::AiNotConfigured | AppError::Upstream(_) | AppError::HttpClientError(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta HTTP traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let code = self.code();

        let (args, details): (Vec<(&str, String)>, Option<Value>) = match &self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            Value::String(store.translate(&locale.0, key, &[]))
                        })
                        .collect();
                    fields.insert(field.to_string(), Value::Array(messages));
                }
                (vec![], Some(Value::Object(fields)))
            }
            AppError::InvalidArgument(detail)
            | AppError::UnknownAction(detail)
            | AppError::InvalidDate(detail) => (vec![("value", detail.clone())], None),
            AppError::LocationNotFound(city) | AppError::LocationAlreadyExists(city) => {
                (vec![("city", city.clone())], None)
            }
            AppError::InvalidStatusTransition { from, action } => (
                vec![("from", from.clone()), ("action", action.clone())],
                None,
            ),
            AppError::AiFeatureDisabled(feature) => {
                (vec![("feature", feature.to_string())], None)
            }
            // O detalhe do provedor é repassado ao cliente.
            AppError::Upstream(detail) => {
                tracing::warn!("Falha no provedor externo: {}", detail);
                (vec![], Some(json!({ "provider": detail })))
            }
            AppError::HttpClientError(e) => {
                tracing::warn!("Falha na chamada ao provedor: {}", e);
                (vec![], Some(json!({ "provider": e.to_string() })))
            }
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (vec![], None)
            }
            _ => (vec![], None),
        };

        let args: Vec<(&str, &str)> = args.iter().map(|(k, v)| (*k, v.as_str())).collect();

        ApiError {
            status,
            error: store.translate(&locale.0, code, &args),
            details,
        }
    }
}

// A resposta de erro que sai da API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// src/models/submission.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::common::error::AppError;

pub const DESCRIPTION_MAX_WORDS: usize = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "submission_status", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Approved => write!(f, "approved"),
            SubmissionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionAction {
    Approve,
    Reject,
}

impl SubmissionAction {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw {
            "approve" => Ok(SubmissionAction::Approve),
            "reject" => Ok(SubmissionAction::Reject),
            other => Err(AppError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for SubmissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionAction::Approve => write!(f, "approve"),
            SubmissionAction::Reject => write!(f, "reject"),
        }
    }
}

/// O que uma ação provoca a partir do status atual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// pending -> approved, criando a oferta
    Promote,
    /// pending -> rejected
    Reject,
    /// A submissão já está no estado pedido
    AlreadyDone,
}

impl SubmissionStatus {
    // approved e rejected são terminais: repetir a mesma ação não faz nada,
    // a ação oposta é recusada.
    pub fn transition(self, action: SubmissionAction) -> Result<Transition, AppError> {
        match (self, action) {
            (SubmissionStatus::Pending, SubmissionAction::Approve) => Ok(Transition::Promote),
            (SubmissionStatus::Pending, SubmissionAction::Reject) => Ok(Transition::Reject),
            (SubmissionStatus::Approved, SubmissionAction::Approve)
            | (SubmissionStatus::Rejected, SubmissionAction::Reject) => Ok(Transition::AlreadyDone),
            (from, action) => Err(AppError::InvalidStatusTransition {
                from: from.to_string(),
                action: action.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub owner_name: Option<String>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub map_link: Option<String>,
    pub social_link: Option<String>,

    #[schema(example = "2025-12-31")]
    pub expiry_date: Option<String>,

    pub image_url: Option<String>,
    pub image: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub(crate) fn validate_word_limit(text: &str) -> Result<(), ValidationError> {
    if text.split_whitespace().count() > DESCRIPTION_MAX_WORDS {
        let mut err = ValidationError::new("word_limit");
        err.add_param("max".into(), &DESCRIPTION_MAX_WORDS);
        err.message = Some("description_too_long".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payload do formulário público.
// Não há campos obrigatórios: quem valida é o formulário no cliente.
// Um `status` enviado pelo cliente é ignorado.
// ---
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    #[schema(example = "2 pizzas pelo preço de 1")]
    pub title: Option<String>,

    #[validate(custom(function = "validate_word_limit"))]
    pub description: Option<String>,

    #[schema(example = "Food")]
    pub category: Option<String>,

    pub owner_name: Option<String>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub map_link: Option<String>,
    pub social_link: Option<String>,
    pub expiry_date: Option<String>,
    pub image_url: Option<String>,
    pub image: Option<String>,
}

// ---
// Edição pelo admin: apenas os campos desta lista são persistidos.
// Chaves desconhecidas (ex: "status") são descartadas pelo serde e
// valores null viram None, mantendo o valor atual.
// ---
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPatch {
    pub title: Option<String>,

    #[validate(custom(function = "validate_word_limit"))]
    pub description: Option<String>,

    pub category: Option<String>,
    pub owner_name: Option<String>,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub map_link: Option<String>,
    pub social_link: Option<String>,
    pub expiry_date: Option<String>,
    pub image_url: Option<String>,
}

impl SubmissionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.owner_name.is_none()
            && self.phone_number.is_none()
            && self.city.is_none()
            && self.area.is_none()
            && self.map_link.is_none()
            && self.social_link.is_none()
            && self.expiry_date.is_none()
            && self.image_url.is_none()
    }
}

// ---
// Filtro da listagem do admin (busca textual + status exato)
// ---
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SubmissionFilter {
    pub search: Option<String>,
    pub status: Option<SubmissionStatus>,
}

impl SubmissionFilter {
    pub fn matches(&self, submission: &Submission) -> bool {
        if let Some(status) = self.status {
            if submission.status != status {
                return false;
            }
        }

        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };

        [
            &submission.title,
            &submission.description,
            &submission.owner_name,
            &submission.phone_number,
            &submission.city,
            &submission.area,
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply(&self, submissions: Vec<Submission>) -> Vec<Submission> {
        submissions.into_iter().filter(|s| self.matches(s)).collect()
    }
}

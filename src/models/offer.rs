// src/models/offer.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::submission::{validate_word_limit, Submission};

// ---
// Oferta publicada. O `id` é o número sequencial da aplicação,
// não o id do banco da submissão de origem.
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[schema(example = 42)]
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub map_link: Option<String>,
    pub category: Option<String>,

    #[schema(example = "2025-12-31")]
    pub expiry_date: Option<NaiveDate>,

    pub city: Option<String>,
    pub area: Option<String>,
    pub owner_name: Option<String>,
    pub phone_number: Option<String>,
    pub social_link: Option<String>,

    // Submissão que originou a oferta (quando promovida)
    pub submission_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Aceita "2025-12-31", "2025-12-31T23:59:59Z" e "31/12/2025".
pub fn parse_expiry_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .ok()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Campos de uma nova oferta (formulário do admin ou promoção de submissão).
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewOffer {
    #[schema(example = "2 pizzas pelo preço de 1")]
    pub title: Option<String>,

    #[validate(custom(function = "validate_word_limit"))]
    pub description: Option<String>,

    pub image: Option<String>,
    pub map_link: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub owner_name: Option<String>,
    pub phone_number: Option<String>,
    pub social_link: Option<String>,
}

impl NewOffer {
    // Copia os campos da submissão (sem id e status).
    // A imagem vem de `image` ou, na falta dele, de `imageUrl`.
    pub fn from_submission(submission: &Submission) -> Self {
        let image = non_empty(&submission.image)
            .or_else(|| non_empty(&submission.image_url))
            .map(str::to_string);

        let expiry_date = submission.expiry_date.as_deref().and_then(parse_expiry_date);
        if expiry_date.is_none() && non_empty(&submission.expiry_date).is_some() {
            tracing::warn!(
                "Validade '{}' da submissão {} não reconhecida; oferta ficará sem validade.",
                submission.expiry_date.as_deref().unwrap_or_default(),
                submission.id
            );
        }

        Self {
            title: submission.title.clone(),
            description: submission.description.clone(),
            image,
            map_link: submission.map_link.clone(),
            category: submission.category.clone(),
            expiry_date,
            city: submission.city.clone(),
            area: submission.area.clone(),
            owner_name: submission.owner_name.clone(),
            phone_number: submission.phone_number.clone(),
            social_link: submission.social_link.clone(),
        }
    }
}

/// Atualização parcial de uma oferta, localizada pelo `id`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    pub id: i64,
    pub title: Option<String>,

    #[validate(custom(function = "validate_word_limit"))]
    pub description: Option<String>,

    pub image: Option<String>,
    pub map_link: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub owner_name: Option<String>,
    pub phone_number: Option<String>,
    pub social_link: Option<String>,
}

/// Filtros públicos da vitrine.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OfferQuery {
    pub city: Option<String>,
    pub area: Option<String>,
    pub category: Option<String>,
}

impl OfferQuery {
    // Strings vazias equivalem a "sem filtro".
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            city: clean(self.city),
            area: clean(self.area),
            category: clean(self.category),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub deleted_count: usize,
    pub deleted_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::{tests::submission, SubmissionStatus};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expiry_date_formats() {
        assert_eq!(parse_expiry_date("2025-12-31"), Some(day(2025, 12, 31)));
        assert_eq!(parse_expiry_date("2025-12-31T10:00:00Z"), Some(day(2025, 12, 31)));
        assert_eq!(parse_expiry_date("2025-12-31T10:00:00.000Z"), Some(day(2025, 12, 31)));
        assert_eq!(parse_expiry_date("31/12/2025"), Some(day(2025, 12, 31)));
        assert_eq!(parse_expiry_date("amanhã"), None);
        assert_eq!(parse_expiry_date("  "), None);
    }

    #[test]
    fn promotion_prefers_image_over_image_url() {
        let mut s = submission("Combo", "Ana", SubmissionStatus::Pending);
        s.image = Some("https://img/a.png".into());
        s.image_url = Some("https://img/b.png".into());
        assert_eq!(NewOffer::from_submission(&s).image.as_deref(), Some("https://img/a.png"));

        s.image = Some("   ".into());
        assert_eq!(NewOffer::from_submission(&s).image.as_deref(), Some("https://img/b.png"));

        s.image_url = None;
        assert_eq!(NewOffer::from_submission(&s).image, None);
    }

    #[test]
    fn promotion_copies_business_fields() {
        let s = submission("Combo", "Ana", SubmissionStatus::Pending);
        let offer = NewOffer::from_submission(&s);
        assert_eq!(offer.title, s.title);
        assert_eq!(offer.owner_name, s.owner_name);
        assert_eq!(offer.city, s.city);
        assert_eq!(offer.area, s.area);
        assert_eq!(offer.expiry_date, Some(day(2099, 12, 31)));
    }

    #[test]
    fn empty_query_filters_are_dropped() {
        let q = OfferQuery {
            city: Some("  ".into()),
            area: Some(" Centro ".into()),
            category: None,
        }
        .normalized();
        assert_eq!(q.city, None);
        assert_eq!(q.area.as_deref(), Some("Centro"));
    }
}

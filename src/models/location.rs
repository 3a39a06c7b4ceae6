// src/models/location.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "location_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    Enabled,
    Disabled,
}

// --- Cidade e seus bairros ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[schema(example = "São Paulo")]
    pub city: String,

    #[schema(example = json!(["Pinheiros", "Moema"]))]
    pub areas: Vec<String>,

    // Registros antigos não têm status: contam como habilitados.
    pub status: Option<LocationStatus>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Limpa a lista de bairros: remove espaços, vazios e repetidos, mantendo a ordem.
pub fn normalize_areas(areas: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(areas.len());
    for area in areas {
        let area = area.trim().to_string();
        if area.is_empty() || seen.iter().any(|a| a.eq_ignore_ascii_case(&area)) {
            continue;
        }
        seen.push(area);
    }
    seen
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationPayload {
    #[validate(length(min = 1, message = "city_required"))]
    pub city: String,

    #[serde(default)]
    pub areas: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationPayload {
    #[validate(length(min = 1, message = "city_required"))]
    pub city: String,

    #[serde(default)]
    pub areas: Vec<String>,

    // Renomeia a cidade
    pub new_city: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetLocationStatusPayload {
    #[validate(length(min = 1, message = "city_required"))]
    pub city: String,
    pub status: LocationStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationKey {
    pub city: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_on_the_wire() {
        let payload: SetLocationStatusPayload =
            serde_json::from_str(r#"{"city": "Recife", "status": "disabled"}"#).unwrap();
        assert_eq!(payload.status, LocationStatus::Disabled);
    }

    #[test]
    fn areas_are_trimmed_and_deduplicated_in_order() {
        let areas = normalize_areas(vec![
            " Boa Viagem ".into(),
            "".into(),
            "Casa Forte".into(),
            "boa viagem".into(),
            "Derby".into(),
        ]);
        assert_eq!(areas, vec!["Boa Viagem", "Casa Forte", "Derby"]);
    }
}

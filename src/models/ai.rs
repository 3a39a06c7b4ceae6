// src/models/ai.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::settings::AiFeature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Title,
    Description,
}

impl ContentKind {
    pub fn feature(self) -> AiFeature {
        match self {
            ContentKind::Title => AiFeature::Title,
            ContentKind::Description => AiFeature::Description,
        }
    }
}

// Só espaços conta como vazio: nada de cota gasta com prompt em branco.
fn validate_prompt(prompt: &str) -> Result<(), ValidationError> {
    if prompt.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("prompt_required".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub kind: ContentKind,

    #[validate(custom(function = "validate_prompt"))]
    #[schema(example = "Pizzaria com rodízio às terças")]
    pub prompt: String,

    pub category: Option<String>,
    pub city: Option<String>,
}

impl GenerateContentRequest {
    /// Instrução enviada ao modelo de texto.
    pub fn instruction(&self) -> String {
        let mut context = String::new();
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            context.push_str(&format!(" Category: {}.", category.trim()));
        }
        if let Some(city) = self.city.as_deref().filter(|c| !c.trim().is_empty()) {
            context.push_str(&format!(" City: {}.", city.trim()));
        }

        match self.kind {
            ContentKind::Title => format!(
                "Write one short, catchy title (max 8 words) for a local business offer.{} \
                 Offer: {}. Reply with the title only.",
                context,
                self.prompt.trim()
            ),
            ContentKind::Description => format!(
                "Write an appealing description of at most 30 words for a local business offer.{} \
                 Offer: {}. Reply with the description only.",
                context,
                self.prompt.trim()
            ),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedContent {
    pub content: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateImageRequest {
    #[validate(custom(function = "validate_prompt"))]
    #[schema(example = "Pizza artesanal sobre mesa de madeira")]
    pub prompt: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub image_url: String,
}

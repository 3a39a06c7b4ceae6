// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Submissions ---
        handlers::submissions::submit_offer,
        handlers::submissions::list_submissions,
        handlers::submissions::edit_submission,
        handlers::submissions::moderate_submission,
        handlers::submissions::clear_submissions,
        handlers::submissions::download_submissions,

        // --- Offers ---
        handlers::offers::list_offers,
        handlers::offers::create_offer,
        handlers::offers::update_offer,
        handlers::offers::delete_offer,
        handlers::offers::sweep_expired_offers,

        // --- Locations ---
        handlers::locations::list_locations,
        handlers::locations::list_enabled_locations,
        handlers::locations::create_location,
        handlers::locations::update_location,
        handlers::locations::set_location_status,
        handlers::locations::delete_location,

        // --- Settings ---
        handlers::settings::get_site_settings,
        handlers::settings::update_site_settings,
        handlers::settings::get_ai_settings,
        handlers::settings::update_ai_settings,
        handlers::settings::get_ai_availability,

        // --- AI ---
        handlers::ai::generate_content,
        handlers::ai::generate_image,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::SessionInfo,

            // --- Submissions ---
            models::submission::SubmissionStatus,
            models::submission::Submission,
            models::submission::NewSubmission,
            models::submission::SubmissionPatch,
            handlers::submissions::SubmitResponse,
            handlers::submissions::EditSubmissionPayload,
            handlers::submissions::SubmissionActionPayload,
            handlers::submissions::ActionResponse,
            handlers::submissions::MessageResponse,
            handlers::submissions::ClearResponse,

            // --- Offers ---
            models::offer::Offer,
            models::offer::NewOffer,
            models::offer::UpdateOfferRequest,
            models::offer::SweepReport,
            handlers::offers::DeleteOfferResponse,

            // --- Locations ---
            models::location::LocationStatus,
            models::location::Location,
            models::location::CreateLocationPayload,
            models::location::UpdateLocationPayload,
            models::location::SetLocationStatusPayload,
            handlers::locations::DeleteLocationResponse,

            // --- Settings ---
            models::settings::SiteSettings,
            models::settings::UpdateSiteSettingsRequest,
            models::settings::AiFeature,
            models::settings::AiSettings,
            models::settings::UpdateAiSettingsRequest,
            models::settings::AiAvailability,

            // --- AI ---
            models::ai::ContentKind,
            models::ai::GenerateContentRequest,
            models::ai::GeneratedContent,
            models::ai::GenerateImageRequest,
            models::ai::GeneratedImage,
        )
    ),
    tags(
        (name = "Auth", description = "Sessão do administrador"),
        (name = "Submissions", description = "Formulário público e moderação"),
        (name = "Offers", description = "Vitrine de ofertas"),
        (name = "Locations", description = "Cidades e bairros"),
        (name = "Settings", description = "Configurações do site e da IA"),
        (name = "AI", description = "Geração de títulos, descrições e imagens")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

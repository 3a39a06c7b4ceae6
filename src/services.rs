pub mod ai_service;
pub mod auth;
pub mod export_service;
pub mod location_service;
pub mod offer_service;
pub mod settings_service;
pub mod submission_service;

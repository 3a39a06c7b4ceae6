pub mod submission_repo;
pub use submission_repo::SubmissionRepository;
pub mod offer_repo;
pub use offer_repo::OfferRepository;
pub mod location_repo;
pub use location_repo::LocationRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;

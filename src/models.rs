pub mod ai;
pub mod auth;
pub mod location;
pub mod offer;
pub mod settings;
pub mod submission;

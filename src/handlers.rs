pub mod ai;
pub mod auth;
pub mod locations;
pub mod offers;
pub mod settings;
pub mod submissions;

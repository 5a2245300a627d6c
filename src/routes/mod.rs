//! HTTP routes for Refuge

pub mod adoptions;
pub mod animals;
pub mod articles;
pub mod donations;
pub mod health;
pub mod reports;
pub mod respond;
pub mod shelters;
pub mod species;

pub use health::{health_check, readiness_check, version_info};
pub use respond::{error_response, json_response, preflight_response};

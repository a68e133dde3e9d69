pub mod auth_service;
pub mod author_lookup;
pub mod dashboard_service;
pub mod listing;
pub mod realisation_service;
pub mod user_service;

pub mod health;
pub mod auth;
pub mod users;
pub mod services;
pub mod technologies;
pub mod realisations;
pub mod articles;
pub mod temoignages;
pub mod candidatures;
pub mod dashboard;

use actix_web::web;

use crate::error::ApiError;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Corps / chemin / query invalides : même format JSON que les autres erreurs
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(health::health_check)
    .service(
        web::scope("/api")
            .service(health::health_check)
            .service(auth::current_user)
            .configure(auth::auth_routes)
            .configure(users::users_routes)
            .configure(services::services_routes)
            .configure(technologies::technologies_routes)
            .configure(realisations::realisations_routes)
            .configure(articles::articles_routes)
            .configure(temoignages::temoignages_routes)
            .configure(candidatures::candidatures_routes)
            .configure(dashboard::dashboard_routes)
    );
}

use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::dashboard_service::DashboardService;

/// GET /dashboard/stats - Statistiques (PROTÉGÉE)
#[get("/stats")]
pub async fn stats(
    _auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let stats = DashboardService::stats(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/dashboard").service(stats));
}

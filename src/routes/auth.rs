use std::net::{IpAddr, SocketAddr};

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::dto::user::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse, UserResponse,
};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::auth_service::AuthService;
use crate::services::user_service::UserService;

/// Adresse IP de l'appelant (X-Forwarded-For / Forwarded, sinon le pair TCP)
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    let info = req.connection_info();
    let raw = info.realip_remote_addr()?;

    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
        .map(|ip| ip.to_string())
}

/// Inscription partagée par /auth/register et POST /users
pub async fn register_user(
    req: &HttpRequest,
    body: RegisterRequest,
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<HttpResponse, ApiError> {
    let user = AuthService::register(db, config, body, client_ip(req)).await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        user_id: user.id,
        username: user.username,
        email: user.email,
    }))
}

/// POST /auth/register - Créer un compte (PUBLIC)
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    register_user(&req, body.into_inner(), db.get_ref(), config.get_ref()).await
}

/// POST /auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let (user, tokens) = AuthService::login(db.get_ref(), config.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        user_id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    }))
}

/// POST /auth/refresh - Nouvel access token (PUBLIC, refresh token requis)
#[post("/refresh")]
pub async fn refresh(
    body: web::Json<RefreshRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let access = AuthService::refresh(db.get_ref(), config.get_ref(), &body.refresh).await?;
    Ok(HttpResponse::Ok().json(RefreshResponse { access }))
}

/// POST /auth/logout - Révoquer le refresh token (PROTÉGÉE)
#[post("/logout")]
pub async fn logout(
    auth_user: AuthUser,
    body: web::Json<RefreshRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    AuthService::logout(db.get_ref(), config.get_ref(), &auth_user, &body.refresh).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully logged out"
    })))
}

/// GET /current-user - Profil de l'appelant (PROTÉGÉE)
#[get("/current-user")]
pub async fn current_user(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let user = UserService::find(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::new(user, config.get_ref())))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(refresh)
            .service(logout)
    );
}

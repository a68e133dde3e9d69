use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};

use crate::config::AppConfig;
use crate::dto::user::{RegisterRequest, UserListItem, UserPatch, UserResponse};
use crate::dto::{list_response, ListQuery};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::users::{Entity as Users, Column as UserColumn};
use crate::routes::auth::register_user;
use crate::services::listing;
use crate::services::user_service::UserService;

/// GET /users - Liste abrégée (PROTÉGÉE)
#[get("")]
pub async fn list_users(
    _auth_user: AuthUser,
    query: web::Query<ListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let select = Users::find()
        .order_by_desc(UserColumn::CreatedAt)
        .order_by_desc(UserColumn::Id);

    let listing = listing::fetch(select, &query, db.get_ref()).await?;
    let results: Vec<UserListItem> = listing.items.into_iter().map(UserListItem::from).collect();

    Ok(list_response(listing.meta, results))
}

/// POST /users - Inscription (PUBLIC)
#[post("")]
pub async fn create_user(
    req: HttpRequest,
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    register_user(&req, body.into_inner(), db.get_ref(), config.get_ref()).await
}

/// GET /users/{id} (PROTÉGÉE)
#[get("/{id}")]
pub async fn get_user(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let user = UserService::find(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::new(user, config.get_ref())))
}

async fn update_user(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UserPatch>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let user = UserService::update(
        db.get_ref(),
        config.get_ref(),
        &auth_user,
        req.method(),
        path.into_inner(),
        body.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(UserResponse::new(user, config.get_ref())))
}

/// PUT /users/{id} - Admin ou soi-même
#[put("/{id}")]
pub async fn put_user(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UserPatch>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    update_user(req, auth_user, path, body, db, config).await
}

/// PATCH /users/{id} - Admin ou soi-même
#[patch("/{id}")]
pub async fn patch_user(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UserPatch>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    update_user(req, auth_user, path, body, db, config).await
}

/// DELETE /users/{id} - ADMIN, refusé pour les comptes protégés
#[delete("/{id}")]
pub async fn delete_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    UserService::delete(db.get_ref(), config.get_ref(), &auth_user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /users/{id}/suspend - ADMIN
#[post("/{id}/suspend")]
pub async fn suspend_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let user = UserService::set_active(db.get_ref(), config.get_ref(), &auth_user, path.into_inner(), false).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("User {} suspended", user.username),
        "user": UserResponse::new(user, config.get_ref())
    })))
}

/// POST /users/{id}/activate - ADMIN
#[post("/{id}/activate")]
pub async fn activate_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let user = UserService::set_active(db.get_ref(), config.get_ref(), &auth_user, path.into_inner(), true).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("User {} activated", user.username),
        "user": UserResponse::new(user, config.get_ref())
    })))
}

/// POST /users/{id}/set-admin - ADMIN
#[post("/{id}/set-admin")]
pub async fn set_admin(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, ApiError> {
    let user = UserService::set_admin(db.get_ref(), config.get_ref(), &auth_user, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("User {} is now an admin", user.username),
        "user": UserResponse::new(user, config.get_ref())
    })))
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(list_users)
            .service(create_user)
            .service(get_user)
            .service(put_user)
            .service(patch_user)
            .service(delete_user)
            .service(suspend_user)
            .service(activate_user)
            .service(set_admin)
    );
}

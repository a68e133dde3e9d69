use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::dto::technology::{TechnologyInput, TechnologyResponse};
use crate::dto::{list_response, validated, ListQuery};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::middleware::permissions::AccessPolicy;
use crate::models::technology::{self, Entity as Technologies, Column as TechnologyColumn};
use crate::services::listing;

const POLICY: AccessPolicy = AccessPolicy::ReadOpenWriteAdmin;

async fn find_technology(db: &DatabaseConnection, id: i32) -> Result<technology::Model, ApiError> {
    Technologies::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Technology", id))
}

/// GET /technologies - Dernières créées d'abord (PUBLIC)
#[get("")]
pub async fn list_technologies(
    query: web::Query<ListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let select = Technologies::find().order_by_desc(TechnologyColumn::Id);

    let listing = listing::fetch(select, &query, db.get_ref()).await?;
    let results: Vec<TechnologyResponse> = listing.items.into_iter().map(TechnologyResponse::from).collect();

    Ok(list_response(listing.meta, results))
}

/// GET /technologies/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_technology(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let technology = find_technology(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TechnologyResponse::from(technology)))
}

/// POST /technologies - ADMIN
#[post("")]
pub async fn create_technology(
    req: HttpRequest,
    auth_user: AuthUser,
    body: web::Json<TechnologyInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;

    let created = technology::ActiveModel {
        name: Set(input.name),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(TechnologyResponse::from(created)))
}

async fn rename_technology(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<TechnologyInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;
    let technology = find_technology(db.get_ref(), path.into_inner()).await?;

    let mut active: technology::ActiveModel = technology.into();
    active.name = Set(input.name);
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(TechnologyResponse::from(updated)))
}

/// PUT /technologies/{id} - ADMIN
#[put("/{id}")]
pub async fn update_technology(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<TechnologyInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    rename_technology(req, auth_user, path, body, db).await
}

/// PATCH /technologies/{id} - ADMIN (`name` est le seul champ)
#[patch("/{id}")]
pub async fn patch_technology(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<TechnologyInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    rename_technology(req, auth_user, path, body, db).await
}

/// DELETE /technologies/{id} - ADMIN, les associations aux réalisations suivent
#[delete("/{id}")]
pub async fn delete_technology(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let id = path.into_inner();

    let result = Technologies::delete_by_id(id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Technology", id));
    }

    Ok(HttpResponse::NoContent().finish())
}

pub fn technologies_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/technologies")
            .service(list_technologies)
            .service(get_technology)
            .service(create_technology)
            .service(update_technology)
            .service(patch_technology)
            .service(delete_technology)
    );
}

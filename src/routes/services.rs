use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::dto::service::{ServiceInput, ServiceListItem, ServicePatch, ServiceResponse};
use crate::dto::{list_response, validated, ListQuery};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::middleware::permissions::AccessPolicy;
use crate::models::service::{self, Entity as Services, Column as ServiceColumn};
use crate::services::{author_lookup, listing};

const POLICY: AccessPolicy = AccessPolicy::ReadOpenWriteAdmin;

async fn find_service(db: &DatabaseConnection, id: i32) -> Result<service::Model, ApiError> {
    Services::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Service", id))
}

/// GET /services - Liste abrégée, plus récents d'abord (PUBLIC)
#[get("")]
pub async fn list_services(
    query: web::Query<ListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let select = Services::find()
        .order_by_desc(ServiceColumn::HeureCree)
        .order_by_desc(ServiceColumn::Id);

    let listing = listing::fetch(select, &query, db.get_ref()).await?;
    let authors = author_lookup::usernames_by_id(db.get_ref(), listing.items.iter().map(|s| s.auteur_id)).await?;
    let results: Vec<ServiceListItem> = listing
        .items
        .into_iter()
        .map(|s| ServiceListItem::new(s, &authors))
        .collect();

    Ok(list_response(listing.meta, results))
}

/// GET /services/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_service(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let service = find_service(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ServiceResponse::from(service)))
}

/// POST /services - ADMIN, auteur = appelant si absent
#[post("")]
pub async fn create_service(
    req: HttpRequest,
    auth_user: AuthUser,
    body: web::Json<ServiceInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;

    let auteur_id = author_lookup::resolve_author(db.get_ref(), input.auteur, Some(auth_user.user_id)).await?;

    let now = Utc::now();
    let mut active = service::ActiveModel {
        heure_cree: Set(now),
        ..Default::default()
    };
    input.write_into(&mut active, auteur_id, now);
    let created = active.insert(db.get_ref()).await?;

    tracing::info!(service_id = created.id, by = %auth_user.username, "service created");
    Ok(HttpResponse::Created().json(ServiceResponse::from(created)))
}

/// PUT /services/{id} - ADMIN, remplacement complet
#[put("/{id}")]
pub async fn update_service(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ServiceInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;
    let service = find_service(db.get_ref(), path.into_inner()).await?;

    let auteur_id = author_lookup::resolve_author(db.get_ref(), input.auteur, service.auteur_id).await?;

    let mut active: service::ActiveModel = service.into();
    input.write_into(&mut active, auteur_id, Utc::now());
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(ServiceResponse::from(updated)))
}

/// PATCH /services/{id} - ADMIN, mise à jour partielle
#[patch("/{id}")]
pub async fn patch_service(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ServicePatch>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let patch = validated(body.into_inner())?;
    let service = find_service(db.get_ref(), path.into_inner()).await?;

    author_lookup::resolve_author(db.get_ref(), patch.auteur, None).await?;

    let mut active: service::ActiveModel = service.into();
    patch.write_into(&mut active, Utc::now());
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(ServiceResponse::from(updated)))
}

/// DELETE /services/{id} - ADMIN
#[delete("/{id}")]
pub async fn delete_service(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let id = path.into_inner();

    let result = Services::delete_by_id(id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Service", id));
    }

    tracing::info!(service_id = id, by = %auth_user.username, "service deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn services_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/services")
            .service(list_services)
            .service(get_service)
            .service(create_service)
            .service(update_service)
            .service(patch_service)
            .service(delete_service)
    );
}

use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::dto::temoignage::{TemoignageInput, TemoignageListItem, TemoignagePatch, TemoignageResponse};
use crate::dto::{list_response, validated, ListQuery};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::middleware::permissions::AccessPolicy;
use crate::models::temoignage::{self, Entity as Temoignages, Column as TemoignageColumn};
use crate::services::{author_lookup, listing};

// Tout utilisateur connecté peut témoigner, seuls les admins modèrent
const POLICY: AccessPolicy = AccessPolicy::ReadOpenPostAnyWriteAdmin;

async fn find_temoignage(db: &DatabaseConnection, id: i32) -> Result<temoignage::Model, ApiError> {
    Temoignages::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Temoignage", id))
}

/// GET /temoignages (PUBLIC)
#[get("")]
pub async fn list_temoignages(
    query: web::Query<ListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let select = Temoignages::find()
        .order_by_desc(TemoignageColumn::HeureCree)
        .order_by_desc(TemoignageColumn::Id);

    let listing = listing::fetch(select, &query, db.get_ref()).await?;
    let authors = author_lookup::usernames_by_id(db.get_ref(), listing.items.iter().map(|t| t.auteur_id)).await?;
    let results: Vec<TemoignageListItem> = listing
        .items
        .into_iter()
        .map(|t| TemoignageListItem::new(t, &authors))
        .collect();

    Ok(list_response(listing.meta, results))
}

/// GET /temoignages/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_temoignage(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let temoignage = find_temoignage(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TemoignageResponse::from(temoignage)))
}

/// POST /temoignages - Tout utilisateur connecté, auteur = appelant
#[post("")]
pub async fn create_temoignage(
    req: HttpRequest,
    auth_user: AuthUser,
    body: web::Json<TemoignageInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;

    let now = Utc::now();
    let mut active = temoignage::ActiveModel {
        heure_cree: Set(now),
        auteur_id: Set(Some(auth_user.user_id)),
        ..Default::default()
    };
    input.write_into(&mut active, now);
    let created = active.insert(db.get_ref()).await?;

    tracing::info!(temoignage_id = created.id, by = %auth_user.username, "temoignage created");
    Ok(HttpResponse::Created().json(TemoignageResponse::from(created)))
}

/// PUT /temoignages/{id} - ADMIN
#[put("/{id}")]
pub async fn update_temoignage(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<TemoignageInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;
    let temoignage = find_temoignage(db.get_ref(), path.into_inner()).await?;

    let mut active: temoignage::ActiveModel = temoignage.into();
    input.write_into(&mut active, Utc::now());
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(TemoignageResponse::from(updated)))
}

/// PATCH /temoignages/{id} - ADMIN
#[patch("/{id}")]
pub async fn patch_temoignage(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<TemoignagePatch>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let patch = validated(body.into_inner())?;
    let temoignage = find_temoignage(db.get_ref(), path.into_inner()).await?;

    let mut active: temoignage::ActiveModel = temoignage.into();
    patch.write_into(&mut active, Utc::now());
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(TemoignageResponse::from(updated)))
}

/// DELETE /temoignages/{id} - ADMIN
#[delete("/{id}")]
pub async fn delete_temoignage(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let id = path.into_inner();

    let result = Temoignages::delete_by_id(id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Temoignage", id));
    }

    tracing::info!(temoignage_id = id, by = %auth_user.username, "temoignage deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn temoignages_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/temoignages")
            .service(list_temoignages)
            .service(get_temoignage)
            .service(create_temoignage)
            .service(update_temoignage)
            .service(patch_temoignage)
            .service(delete_temoignage)
    );
}

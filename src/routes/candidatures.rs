use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::dto::candidature::{CandidatureInput, CandidatureListItem, CandidaturePatch, CandidatureResponse};
use crate::dto::{list_response, validated, ListQuery};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::middleware::permissions::OwnerOrAdmin;
use crate::models::candidature::{self, Entity as Candidatures, Column as CandidatureColumn};
use crate::services::{author_lookup, listing};

/// Candidature visible par l'appelant : toutes pour un admin, les siennes sinon.
/// Une candidature d'un autre utilisateur est traitée comme inexistante.
async fn find_visible(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
    id: i32,
) -> Result<candidature::Model, ApiError> {
    let mut select = Candidatures::find_by_id(id);
    if !auth_user.is_admin() {
        select = select.filter(CandidatureColumn::UserId.eq(auth_user.user_id));
    }

    select
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Candidature", id))
}

/// GET /candidatures (PROTÉGÉE)
#[get("")]
pub async fn list_candidatures(
    auth_user: AuthUser,
    query: web::Query<ListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let mut select = Candidatures::find()
        .order_by_desc(CandidatureColumn::CreatedAt)
        .order_by_desc(CandidatureColumn::Id);
    if !auth_user.is_admin() {
        select = select.filter(CandidatureColumn::UserId.eq(auth_user.user_id));
    }

    let listing = listing::fetch(select, &query, db.get_ref()).await?;
    let users = author_lookup::usernames_by_id(db.get_ref(), listing.items.iter().map(|c| Some(c.user_id))).await?;
    let results: Vec<CandidatureListItem> = listing
        .items
        .into_iter()
        .map(|c| CandidatureListItem::new(c, &users))
        .collect();

    Ok(list_response(listing.meta, results))
}

/// GET /candidatures/{id} (PROTÉGÉE)
#[get("/{id}")]
pub async fn get_candidature(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let candidature = find_visible(db.get_ref(), &auth_user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CandidatureResponse::from(candidature)))
}

/// POST /candidatures - Pour l'appelant uniquement
#[post("")]
pub async fn create_candidature(
    auth_user: AuthUser,
    body: web::Json<CandidatureInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let input = validated(body.into_inner())?;

    let mut active = candidature::ActiveModel {
        user_id: Set(auth_user.user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    input.write_into(&mut active);
    let created = active.insert(db.get_ref()).await?;

    tracing::info!(candidature_id = created.id, user_id = auth_user.user_id, "candidature submitted");
    Ok(HttpResponse::Created().json(CandidatureResponse::from(created)))
}

/// PUT /candidatures/{id} - Propriétaire ou admin
#[put("/{id}")]
pub async fn update_candidature(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CandidatureInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let input = validated(body.into_inner())?;
    let candidature = find_visible(db.get_ref(), &auth_user, path.into_inner()).await?;
    OwnerOrAdmin::has_object_permission(req.method(), Some(&auth_user), Some(candidature.user_id))?;

    let mut active: candidature::ActiveModel = candidature.into();
    input.write_into(&mut active);
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(CandidatureResponse::from(updated)))
}

/// PATCH /candidatures/{id} - Propriétaire ou admin
#[patch("/{id}")]
pub async fn patch_candidature(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<CandidaturePatch>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let patch = validated(body.into_inner())?;
    let candidature = find_visible(db.get_ref(), &auth_user, path.into_inner()).await?;
    OwnerOrAdmin::has_object_permission(req.method(), Some(&auth_user), Some(candidature.user_id))?;

    let mut active: candidature::ActiveModel = candidature.into();
    patch.write_into(&mut active);
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(CandidatureResponse::from(updated)))
}

/// DELETE /candidatures/{id} - Propriétaire ou admin
#[delete("/{id}")]
pub async fn delete_candidature(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let candidature = find_visible(db.get_ref(), &auth_user, path.into_inner()).await?;
    OwnerOrAdmin::has_object_permission(req.method(), Some(&auth_user), Some(candidature.user_id))?;

    Candidatures::delete_by_id(candidature.id).exec(db.get_ref()).await?;

    tracing::info!(candidature_id = candidature.id, by = %auth_user.username, "candidature deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn candidatures_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/candidatures")
            .service(list_candidatures)
            .service(get_candidature)
            .service(create_candidature)
            .service(update_candidature)
            .service(patch_candidature)
            .service(delete_candidature)
    );
}

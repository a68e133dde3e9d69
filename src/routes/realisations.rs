use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::dto::realisation::{RealisationInput, RealisationListItem, RealisationPatch, RealisationResponse};
use crate::dto::{list_response, validated, ListQuery};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::middleware::permissions::AccessPolicy;
use crate::models::realisation::{self, Entity as Realisations, Column as RealisationColumn};
use crate::services::realisation_service::RealisationService;
use crate::services::{author_lookup, listing};

const POLICY: AccessPolicy = AccessPolicy::ReadOpenWriteAdmin;

async fn find_realisation(db: &DatabaseConnection, id: i32) -> Result<realisation::Model, ApiError> {
    Realisations::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Realisation", id))
}

/// GET /realisations - Liste abrégée avec les noms de technologies (PUBLIC)
#[get("")]
pub async fn list_realisations(
    query: web::Query<ListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let select = Realisations::find()
        .order_by_desc(RealisationColumn::HeureCree)
        .order_by_desc(RealisationColumn::Id);

    let listing = listing::fetch(select, &query, db.get_ref()).await?;

    let ids: Vec<i32> = listing.items.iter().map(|r| r.id).collect();
    let mut technologies = RealisationService::technologies_for(db.get_ref(), &ids).await?;
    let authors = author_lookup::usernames_by_id(db.get_ref(), listing.items.iter().map(|r| r.auteur_id)).await?;

    let results: Vec<RealisationListItem> = listing
        .items
        .into_iter()
        .map(|r| {
            let techs = technologies.remove(&r.id).unwrap_or_default();
            RealisationListItem::new(r, techs, &authors)
        })
        .collect();

    Ok(list_response(listing.meta, results))
}

/// GET /realisations/{id} - Détail avec les technologies complètes (PUBLIC)
#[get("/{id}")]
pub async fn get_realisation(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let realisation = find_realisation(db.get_ref(), path.into_inner()).await?;
    let technologies = RealisationService::technologies_for(db.get_ref(), &[realisation.id])
        .await?
        .remove(&realisation.id)
        .unwrap_or_default();

    Ok(HttpResponse::Ok().json(RealisationResponse::new(realisation, technologies)))
}

/// POST /realisations - ADMIN, réalisation et associations en une transaction
#[post("")]
pub async fn create_realisation(
    req: HttpRequest,
    auth_user: AuthUser,
    body: web::Json<RealisationInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;

    let auteur_id = author_lookup::resolve_author(db.get_ref(), input.auteur, Some(auth_user.user_id)).await?;

    let now = Utc::now();
    let mut active = realisation::ActiveModel {
        heure_cree: Set(now),
        ..Default::default()
    };
    input.write_into(&mut active, auteur_id, now);

    let (created, technologies) =
        RealisationService::save(db.get_ref(), active, Some(input.technologies.as_slice())).await?;

    tracing::info!(realisation_id = created.id, by = %auth_user.username, "realisation created");
    Ok(HttpResponse::Created().json(RealisationResponse::new(created, technologies)))
}

/// PUT /realisations/{id} - ADMIN, remplace aussi la liste des technologies
#[put("/{id}")]
pub async fn update_realisation(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<RealisationInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;
    let realisation = find_realisation(db.get_ref(), path.into_inner()).await?;

    let auteur_id = author_lookup::resolve_author(db.get_ref(), input.auteur, realisation.auteur_id).await?;

    let mut active: realisation::ActiveModel = realisation.into();
    input.write_into(&mut active, auteur_id, Utc::now());

    let (updated, technologies) =
        RealisationService::save(db.get_ref(), active, Some(input.technologies.as_slice())).await?;

    Ok(HttpResponse::Ok().json(RealisationResponse::new(updated, technologies)))
}

/// PATCH /realisations/{id} - ADMIN
#[patch("/{id}")]
pub async fn patch_realisation(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<RealisationPatch>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let patch = validated(body.into_inner())?;
    let realisation = find_realisation(db.get_ref(), path.into_inner()).await?;

    author_lookup::resolve_author(db.get_ref(), patch.auteur, None).await?;

    let mut active: realisation::ActiveModel = realisation.into();
    patch.write_into(&mut active, Utc::now());

    let (updated, technologies) =
        RealisationService::save(db.get_ref(), active, patch.technologies.as_deref()).await?;

    Ok(HttpResponse::Ok().json(RealisationResponse::new(updated, technologies)))
}

/// DELETE /realisations/{id} - ADMIN
#[delete("/{id}")]
pub async fn delete_realisation(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let id = path.into_inner();

    let result = Realisations::delete_by_id(id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Realisation", id));
    }

    tracing::info!(realisation_id = id, by = %auth_user.username, "realisation deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn realisations_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/realisations")
            .service(list_realisations)
            .service(get_realisation)
            .service(create_realisation)
            .service(update_realisation)
            .service(patch_realisation)
            .service(delete_realisation)
    );
}

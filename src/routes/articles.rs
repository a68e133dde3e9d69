use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::dto::article::{ArticleInput, ArticleListItem, ArticlePatch, ArticleResponse};
use crate::dto::{list_response, validated, ListQuery};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::middleware::permissions::AccessPolicy;
use crate::models::article::{self, Entity as Articles, Column as ArticleColumn};
use crate::services::{author_lookup, listing};

const POLICY: AccessPolicy = AccessPolicy::ReadOpenWriteAdmin;

async fn find_article(db: &DatabaseConnection, id: i32) -> Result<article::Model, ApiError> {
    Articles::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Article", id))
}

/// GET /articles - Liste abrégée, plus récents d'abord (PUBLIC)
#[get("")]
pub async fn list_articles(
    query: web::Query<ListQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let select = Articles::find()
        .order_by_desc(ArticleColumn::HeureCree)
        .order_by_desc(ArticleColumn::Id);

    let listing = listing::fetch(select, &query, db.get_ref()).await?;
    let authors = author_lookup::usernames_by_id(db.get_ref(), listing.items.iter().map(|s| s.auteur_id)).await?;
    let results: Vec<ArticleListItem> = listing
        .items
        .into_iter()
        .map(|s| ArticleListItem::new(s, &authors))
        .collect();

    Ok(list_response(listing.meta, results))
}

/// GET /articles/{id} (PUBLIC)
#[get("/{id}")]
pub async fn get_article(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    let article = find_article(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ArticleResponse::from(article)))
}

/// POST /articles - ADMIN, auteur = appelant si absent
#[post("")]
pub async fn create_article(
    req: HttpRequest,
    auth_user: AuthUser,
    body: web::Json<ArticleInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;

    let auteur_id = author_lookup::resolve_author(db.get_ref(), input.auteur, Some(auth_user.user_id)).await?;

    let now = Utc::now();
    let mut active = article::ActiveModel {
        heure_cree: Set(now),
        ..Default::default()
    };
    input.write_into(&mut active, auteur_id, now);
    let created = active.insert(db.get_ref()).await?;

    tracing::info!(article_id = created.id, by = %auth_user.username, "article created");
    Ok(HttpResponse::Created().json(ArticleResponse::from(created)))
}

/// PUT /articles/{id} - ADMIN, remplacement complet
#[put("/{id}")]
pub async fn update_article(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ArticleInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let input = validated(body.into_inner())?;
    let article = find_article(db.get_ref(), path.into_inner()).await?;

    let auteur_id = author_lookup::resolve_author(db.get_ref(), input.auteur, article.auteur_id).await?;

    let mut active: article::ActiveModel = article.into();
    input.write_into(&mut active, auteur_id, Utc::now());
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(ArticleResponse::from(updated)))
}

/// PATCH /articles/{id} - ADMIN, mise à jour partielle
#[patch("/{id}")]
pub async fn patch_article(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<ArticlePatch>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let patch = validated(body.into_inner())?;
    let article = find_article(db.get_ref(), path.into_inner()).await?;

    author_lookup::resolve_author(db.get_ref(), patch.auteur, None).await?;

    let mut active: article::ActiveModel = article.into();
    patch.write_into(&mut active, Utc::now());
    let updated = active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(ArticleResponse::from(updated)))
}

/// DELETE /articles/{id} - ADMIN
#[delete("/{id}")]
pub async fn delete_article(
    req: HttpRequest,
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, ApiError> {
    POLICY.check(req.method(), Some(&auth_user))?;
    let id = path.into_inner();

    let result = Articles::delete_by_id(id).exec(db.get_ref()).await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Article", id));
    }

    tracing::info!(article_id = id, by = %auth_user.username, "article deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn articles_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/articles")
            .service(list_articles)
            .service(get_article)
            .service(create_article)
            .service(update_article)
            .service(patch_article)
            .service(delete_article)
    );
}

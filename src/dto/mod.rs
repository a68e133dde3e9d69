// ============================================================================
// DTO - PROJECTIONS LECTURE/ÉCRITURE
// ============================================================================
//
// Une structure explicite par endpoint :
//   - <Model>Response : projection complète (GET /{id}, POST, PUT, PATCH)
//   - <Model>ListItem : projection abrégée des listes (+ auteur_username)
//   - <Model>Input    : corps de création / remplacement (PUT)
//   - <Model>Patch    : corps de mise à jour partielle (PATCH)
//
// Les entrées sont validées (validator) avant toute écriture en base.
//
// ============================================================================

pub mod article;
pub mod candidature;
pub mod realisation;
pub mod service;
pub mod technology;
pub mod temoignage;
pub mod user;

use actix_web::HttpResponse;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// ?page=2&page_size=10 ; sans `page`, la liste complète est renvoyée
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ListQuery {
    /// (index de page 0-based, taille) si la pagination est demandée
    pub fn pagination(&self) -> Result<Option<(u64, u64)>, ApiError> {
        let Some(page) = self.page else {
            return Ok(None);
        };
        if page == 0 {
            return Err(ApiError::field("page", "page must be >= 1"));
        }
        let size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        Ok(Some((page - 1, size)))
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageMeta {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    #[serde(flatten)]
    pub meta: PageMeta,
    pub results: Vec<T>,
}

/// Tableau brut sans pagination, enveloppe {count, page, page_size, results} sinon
pub fn list_response<T: Serialize>(meta: Option<PageMeta>, results: Vec<T>) -> HttpResponse {
    match meta {
        Some(meta) => HttpResponse::Ok().json(Page { meta, results }),
        None => HttpResponse::Ok().json(results),
    }
}

/// Champ effaçable d'un PATCH : absent -> None, `null` -> Some(None),
/// valeur -> Some(Some(v)). S'utilise avec `#[serde(default)]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Valide un corps de requête et le renvoie
pub fn validated<T: Validate>(input: T) -> Result<T, ApiError> {
    input.validate()?;
    Ok(input)
}

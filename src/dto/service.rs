use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::service;

#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    pub id: i32,
    pub titre: String,
    pub img: Option<String>,
    pub description: String,
    pub heure_cree: DateTime<Utc>,
    pub heure_modifiee: DateTime<Utc>,
    pub auteur: Option<i32>,
}

impl From<service::Model> for ServiceResponse {
    fn from(model: service::Model) -> Self {
        Self {
            id: model.id,
            titre: model.titre,
            img: model.img,
            description: model.description,
            heure_cree: model.heure_cree,
            heure_modifiee: model.heure_modifiee,
            auteur: model.auteur_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceListItem {
    pub id: i32,
    pub titre: String,
    pub img: Option<String>,
    pub heure_cree: DateTime<Utc>,
    pub auteur_username: Option<String>,
}

impl ServiceListItem {
    pub fn new(model: service::Model, authors: &HashMap<i32, String>) -> Self {
        Self {
            auteur_username: model.auteur_id.and_then(|id| authors.get(&id).cloned()),
            id: model.id,
            titre: model.titre,
            img: model.img,
            heure_cree: model.heure_cree,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ServiceInput {
    #[validate(length(min = 1, max = 100, message = "titre must be 1 to 100 characters"))]
    pub titre: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(max = 255, message = "img reference is too long"))]
    pub img: Option<String>,
    pub auteur: Option<i32>,
}

impl ServiceInput {
    /// Remplit tous les champs (POST et PUT)
    pub fn write_into(self, active: &mut service::ActiveModel, auteur_id: Option<i32>, now: DateTime<Utc>) {
        active.titre = Set(self.titre);
        active.description = Set(self.description);
        active.img = Set(self.img);
        active.auteur_id = Set(auteur_id);
        active.heure_modifiee = Set(now);
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ServicePatch {
    #[validate(length(min = 1, max = 100, message = "titre must be 1 to 100 characters"))]
    pub titre: Option<String>,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::nullable")]
    #[validate(length(max = 255, message = "img reference is too long"))]
    pub img: Option<Option<String>>,
    pub auteur: Option<i32>,
}

impl ServicePatch {
    /// Seuls les champs présents sont modifiés (auteur vérifié par l'appelant)
    pub fn write_into(self, active: &mut service::ActiveModel, now: DateTime<Utc>) {
        if let Some(titre) = self.titre {
            active.titre = Set(titre);
        }
        if let Some(description) = self.description {
            active.description = Set(description);
        }
        if let Some(img) = self.img {
            active.img = Set(img);
        }
        if let Some(auteur) = self.auteur {
            active.auteur_id = Set(Some(auteur));
        }
        active.heure_modifiee = Set(now);
    }
}

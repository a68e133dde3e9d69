use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::temoignage;

#[derive(Debug, Serialize)]
pub struct TemoignageResponse {
    pub id: i32,
    pub nom: String,
    pub description: String,
    pub img: Option<String>,
    pub heure_cree: DateTime<Utc>,
    pub heure_modifiee: DateTime<Utc>,
    pub auteur: Option<i32>,
}

impl From<temoignage::Model> for TemoignageResponse {
    fn from(model: temoignage::Model) -> Self {
        Self {
            id: model.id,
            nom: model.nom,
            description: model.description,
            img: model.img,
            heure_cree: model.heure_cree,
            heure_modifiee: model.heure_modifiee,
            auteur: model.auteur_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TemoignageListItem {
    pub id: i32,
    pub nom: String,
    pub description: String,
    pub img: Option<String>,
    pub heure_cree: DateTime<Utc>,
    pub auteur_username: Option<String>,
}

impl TemoignageListItem {
    pub fn new(model: temoignage::Model, authors: &HashMap<i32, String>) -> Self {
        Self {
            auteur_username: model.auteur_id.and_then(|id| authors.get(&id).cloned()),
            id: model.id,
            nom: model.nom,
            description: model.description,
            img: model.img,
            heure_cree: model.heure_cree,
        }
    }
}

/// L'auteur n'est jamais lu dans le corps : c'est toujours l'appelant
#[derive(Debug, Deserialize, Validate)]
pub struct TemoignageInput {
    #[validate(length(min = 1, max = 100, message = "nom must be 1 to 100 characters"))]
    pub nom: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(max = 255, message = "img reference is too long"))]
    pub img: Option<String>,
}

impl TemoignageInput {
    pub fn write_into(self, active: &mut temoignage::ActiveModel, now: DateTime<Utc>) {
        active.nom = Set(self.nom);
        active.description = Set(self.description);
        active.img = Set(self.img);
        active.heure_modifiee = Set(now);
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TemoignagePatch {
    #[validate(length(min = 1, max = 100, message = "nom must be 1 to 100 characters"))]
    pub nom: Option<String>,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::nullable")]
    #[validate(length(max = 255, message = "img reference is too long"))]
    pub img: Option<Option<String>>,
}

impl TemoignagePatch {
    pub fn write_into(self, active: &mut temoignage::ActiveModel, now: DateTime<Utc>) {
        if let Some(nom) = self.nom {
            active.nom = Set(nom);
        }
        if let Some(description) = self.description {
            active.description = Set(description);
        }
        if let Some(img) = self.img {
            active.img = Set(img);
        }
        active.heure_modifiee = Set(now);
    }
}

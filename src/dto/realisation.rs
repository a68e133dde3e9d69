use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::technology::TechnologyResponse;
use crate::models::{realisation, technology};

#[derive(Debug, Serialize)]
pub struct RealisationResponse {
    pub id: i32,
    pub titre: String,
    pub img: Option<String>,
    pub description: String,
    pub client: String,
    pub technologies: Vec<TechnologyResponse>,
    pub heure_cree: DateTime<Utc>,
    pub heure_modifiee: DateTime<Utc>,
    pub auteur: Option<i32>,
}

impl RealisationResponse {
    pub fn new(model: realisation::Model, technologies: Vec<technology::Model>) -> Self {
        Self {
            id: model.id,
            titre: model.titre,
            img: model.img,
            description: model.description,
            client: model.client,
            technologies: technologies.into_iter().map(TechnologyResponse::from).collect(),
            heure_cree: model.heure_cree,
            heure_modifiee: model.heure_modifiee,
            auteur: model.auteur_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RealisationListItem {
    pub id: i32,
    pub titre: String,
    pub img: Option<String>,
    pub client: String,
    pub technology_names: Vec<String>,
    pub heure_cree: DateTime<Utc>,
    pub auteur_username: Option<String>,
}

impl RealisationListItem {
    pub fn new(
        model: realisation::Model,
        technologies: Vec<technology::Model>,
        authors: &HashMap<i32, String>,
    ) -> Self {
        Self {
            auteur_username: model.auteur_id.and_then(|id| authors.get(&id).cloned()),
            technology_names: technologies.into_iter().map(|t| t.name).collect(),
            id: model.id,
            titre: model.titre,
            img: model.img,
            client: model.client,
            heure_cree: model.heure_cree,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RealisationInput {
    #[validate(length(min = 1, max = 100, message = "titre must be 1 to 100 characters"))]
    pub titre: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 100, message = "client must be 1 to 100 characters"))]
    pub client: String,
    #[validate(length(max = 255, message = "img reference is too long"))]
    pub img: Option<String>,
    #[serde(default)]
    pub technologies: Vec<i32>,
    pub auteur: Option<i32>,
}

impl RealisationInput {
    pub fn write_into(&self, active: &mut realisation::ActiveModel, auteur_id: Option<i32>, now: DateTime<Utc>) {
        active.titre = Set(self.titre.clone());
        active.description = Set(self.description.clone());
        active.client = Set(self.client.clone());
        active.img = Set(self.img.clone());
        active.auteur_id = Set(auteur_id);
        active.heure_modifiee = Set(now);
    }
}

/// `technologies` absent : associations conservées ; présent : remplacées
#[derive(Debug, Deserialize, Validate)]
pub struct RealisationPatch {
    #[validate(length(min = 1, max = 100, message = "titre must be 1 to 100 characters"))]
    pub titre: Option<String>,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100, message = "client must be 1 to 100 characters"))]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::nullable")]
    #[validate(length(max = 255, message = "img reference is too long"))]
    pub img: Option<Option<String>>,
    pub technologies: Option<Vec<i32>>,
    pub auteur: Option<i32>,
}

impl RealisationPatch {
    pub fn write_into(&self, active: &mut realisation::ActiveModel, now: DateTime<Utc>) {
        if let Some(titre) = &self.titre {
            active.titre = Set(titre.clone());
        }
        if let Some(description) = &self.description {
            active.description = Set(description.clone());
        }
        if let Some(client) = &self.client {
            active.client = Set(client.clone());
        }
        if let Some(img) = &self.img {
            active.img = Set(img.clone());
        }
        if let Some(auteur) = self.auteur {
            active.auteur_id = Set(Some(auteur));
        }
        active.heure_modifiee = Set(now);
    }
}

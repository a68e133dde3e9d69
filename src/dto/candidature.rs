use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::candidature::{self, ApplicationType};

#[derive(Debug, Serialize)]
pub struct CandidatureResponse {
    pub id: i32,
    pub user: i32,
    pub application_type: ApplicationType,
    pub cv: Option<String>,
    pub start_month: String,
    pub created_at: DateTime<Utc>,
}

impl From<candidature::Model> for CandidatureResponse {
    fn from(model: candidature::Model) -> Self {
        Self {
            id: model.id,
            user: model.user_id,
            application_type: model.application_type,
            cv: model.cv,
            start_month: model.start_month,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CandidatureListItem {
    pub id: i32,
    pub username: Option<String>,
    pub application_type: ApplicationType,
    pub start_month: String,
    pub created_at: DateTime<Utc>,
}

impl CandidatureListItem {
    pub fn new(model: candidature::Model, users: &HashMap<i32, String>) -> Self {
        Self {
            username: users.get(&model.user_id).cloned(),
            id: model.id,
            application_type: model.application_type,
            start_month: model.start_month,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CandidatureInput {
    #[serde(default)]
    pub application_type: ApplicationType,
    #[validate(length(max = 255, message = "cv reference is too long"))]
    pub cv: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50, message = "start_month must be at most 50 characters"))]
    pub start_month: String,
}

impl CandidatureInput {
    pub fn write_into(self, active: &mut candidature::ActiveModel) {
        active.application_type = Set(self.application_type);
        active.cv = Set(self.cv);
        active.start_month = Set(self.start_month);
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CandidaturePatch {
    pub application_type: Option<ApplicationType>,
    #[serde(default, deserialize_with = "crate::dto::nullable")]
    #[validate(length(max = 255, message = "cv reference is too long"))]
    pub cv: Option<Option<String>>,
    #[validate(length(max = 50, message = "start_month must be at most 50 characters"))]
    pub start_month: Option<String>,
}

impl CandidaturePatch {
    pub fn write_into(self, active: &mut candidature::ActiveModel) {
        if let Some(application_type) = self.application_type {
            active.application_type = Set(application_type);
        }
        if let Some(cv) = self.cv {
            active.cv = Set(cv);
        }
        if let Some(start_month) = self.start_month {
            active.start_month = Set(start_month);
        }
    }
}

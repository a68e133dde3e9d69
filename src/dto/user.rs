use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::AppConfig;
use crate::models::users::{self, Role};

// DTO pour l'inscription
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 150, message = "username must be 1 to 150 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i32,
    pub username: String,
    pub email: String,
}

// DTO pour la connexion
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// Réponse après login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Corps de /auth/refresh et /auth/logout
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Profil complet (jamais le hash du mot de passe)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_predefined_admin: bool,
    pub cv: Option<String>,
    pub ip_address: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(model: users::Model, config: &AppConfig) -> Self {
        Self {
            is_predefined_admin: config.is_protected(&model.username),
            id: model.id,
            email: model.email,
            username: model.username,
            role: model.role,
            is_active: model.is_active,
            is_verified: model.is_verified,
            cv: model.cv,
            ip_address: model.ip_address,
            last_login: model.last_login,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserListItem {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

/// PUT/PATCH /users/{id} : `role` et `is_verified` réservés aux admins
#[derive(Debug, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 150, message = "username must be 1 to 150 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "crate::dto::nullable")]
    #[validate(length(max = 255, message = "cv reference is too long"))]
    pub cv: Option<Option<String>>,
    pub is_verified: Option<bool>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn touches_admin_fields(&self) -> bool {
        self.role.is_some() || self.is_verified.is_some()
    }
}

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::users::{Entity as Users, Role};
use crate::utils::jwt::{self, Claims, TokenType};

/// Structure qui contient les infos de l'utilisateur authentifié
/// Utilisée comme extracteur dans les routes protégées.
/// `Option<AuthUser>` donne None (sans erreur) pour les routes publiques.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::admin_required())
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = verified_claims(req);
        let db = req.app_data::<web::Data<DatabaseConnection>>().cloned();

        Box::pin(async move {
            let claims = claims?;
            let db = db.ok_or_else(|| ApiError::Internal("DatabaseConnection is not registered".to_string()))?;

            // 4. Le compte fait foi : suspension et changement de rôle
            //    s'appliquent sans attendre l'expiration du token
            let user = Users::find_by_id(claims.sub)
                .one(db.get_ref())
                .await?
                .ok_or(ApiError::InvalidToken)?;

            if !user.is_active {
                return Err(ApiError::AccountSuspended);
            }

            Ok(AuthUser {
                user_id: user.id,
                username: user.username,
                role: user.role,
            })
        })
    }
}

fn verified_claims(req: &HttpRequest) -> Result<Claims, ApiError> {
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| ApiError::Internal("AppConfig is not registered".to_string()))?;

    // 1. Extraire le header Authorization
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(ApiError::authentication_required)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthenticated("Invalid Authorization header".to_string()))?;

    // 2. Extraire le token (format: "Bearer <token>")
    let token = auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthenticated("Invalid Authorization format (expected: Bearer <token>)".to_string())
    })?;

    // 3. Vérifier le token JWT (un refresh token n'est pas accepté ici)
    Ok(jwt::verify_token(config, token.trim(), TokenType::Access)?)
}

// ============================================================================
// CONTRÔLE D'ACCÈS
// ============================================================================
//
// Prédicats purs (méthode HTTP, identité, propriétaire éventuel),
// évalués à chaque requête, jamais mis en cache.
//
//   - ReadOpenWriteAdmin        : lecture libre, écriture admin
//   - ReadOpenPostAnyWriteAdmin : lecture libre, POST authentifié,
//                                 PUT/PATCH/DELETE admin
//   - OwnerOrAdmin              : lecture libre, écriture admin ou auteur
//
// ============================================================================

use actix_web::http::Method;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::users::Role;

/// GET, HEAD, OPTIONS
pub fn is_safe(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    ReadOpenWriteAdmin,
    ReadOpenPostAnyWriteAdmin,
}

impl AccessPolicy {
    pub fn check(self, method: &Method, identity: Option<&AuthUser>) -> Result<(), ApiError> {
        if is_safe(method) {
            return Ok(());
        }

        let user = identity.ok_or_else(ApiError::authentication_required)?;

        match self {
            AccessPolicy::ReadOpenWriteAdmin => require_role_admin(user.role),
            AccessPolicy::ReadOpenPostAnyWriteAdmin if *method == Method::POST => Ok(()),
            AccessPolicy::ReadOpenPostAnyWriteAdmin => require_role_admin(user.role),
        }
    }
}

/// Permission objet : l'auteur peut modifier son propre enregistrement
pub struct OwnerOrAdmin;

impl OwnerOrAdmin {
    pub fn has_object_permission(
        method: &Method,
        identity: Option<&AuthUser>,
        owner_id: Option<i32>,
    ) -> Result<(), ApiError> {
        if is_safe(method) {
            return Ok(());
        }

        let user = identity.ok_or_else(ApiError::authentication_required)?;

        match user.role {
            Role::Admin => Ok(()),
            Role::Guest | Role::User if owner_id == Some(user.user_id) => Ok(()),
            Role::Guest | Role::User => Err(ApiError::Forbidden(
                "Only the author or an admin can modify this resource".to_string(),
            )),
        }
    }
}

fn require_role_admin(role: Role) -> Result<(), ApiError> {
    match role {
        Role::Admin => Ok(()),
        Role::Guest | Role::User => Err(ApiError::admin_required()),
    }
}

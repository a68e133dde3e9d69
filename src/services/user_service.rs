// ============================================================================
// SERVICE : GESTION DES UTILISATEURS (actions admin)
// ============================================================================
//
// Machine à états d'un compte :
//   - rôle   : guest -> user -> admin (PATCH role, POST set-admin)
//   - statut : actif <-> suspendu     (POST suspend / activate)
//
// Les usernames protégés (PROTECTED_USERNAMES) sont vérifiés en premier
// dans toute opération destructive ou qui change le rôle.
//
// ============================================================================

use actix_web::http::Method;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::config::{AppConfig, BootstrapAdmin};
use crate::dto::user::UserPatch;
use crate::dto::validated;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::AuthUser;
use crate::middleware::permissions::OwnerOrAdmin;
use crate::models::users::{self, Entity as Users, Column as UserColumn, Role};
use crate::services::auth_service::{normalize_email, normalize_username, AuthService};
use crate::utils::password;

pub struct UserService;

impl UserService {
    pub async fn find(db: &DatabaseConnection, id: i32) -> Result<users::Model, ApiError> {
        Users::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("User", id))
    }

    fn ensure_not_protected(config: &AppConfig, user: &users::Model) -> Result<(), ApiError> {
        if config.is_protected(&user.username) {
            tracing::warn!(username = %user.username, "operation refused on protected account");
            return Err(ApiError::ProtectedAccount(user.username.clone()));
        }
        Ok(())
    }

    /// suspend (active = false) / activate (active = true) - ADMIN
    pub async fn set_active(
        db: &DatabaseConnection,
        config: &AppConfig,
        caller: &AuthUser,
        id: i32,
        active: bool,
    ) -> Result<users::Model, ApiError> {
        let user = Self::find(db, id).await?;
        Self::ensure_not_protected(config, &user)?;
        caller.require_admin()?;

        let mut model: users::ActiveModel = user.into();
        model.is_active = Set(active);
        let user = model.update(db).await?;

        tracing::info!(target_id = user.id, by = %caller.username, active, "user status changed");
        Ok(user)
    }

    /// Promotion en admin - réservé aux admins
    pub async fn set_admin(
        db: &DatabaseConnection,
        config: &AppConfig,
        caller: &AuthUser,
        id: i32,
    ) -> Result<users::Model, ApiError> {
        if !caller.is_admin() {
            return Err(ApiError::Forbidden("Only admins can grant the admin role".to_string()));
        }
        let user = Self::find(db, id).await?;
        Self::ensure_not_protected(config, &user)?;

        let mut model: users::ActiveModel = user.into();
        model.role = Set(Role::Admin);
        let user = model.update(db).await?;

        tracing::info!(target_id = user.id, by = %caller.username, "user promoted to admin");
        Ok(user)
    }

    /// Suppression - ADMIN. Le contenu écrit par l'utilisateur est conservé
    /// (auteur mis à NULL par la clé étrangère), ses candidatures supprimées.
    pub async fn delete(
        db: &DatabaseConnection,
        config: &AppConfig,
        caller: &AuthUser,
        id: i32,
    ) -> Result<(), ApiError> {
        let user = Self::find(db, id).await?;
        Self::ensure_not_protected(config, &user)?;
        caller.require_admin()?;

        Users::delete_by_id(user.id).exec(db).await?;

        tracing::info!(target_id = id, by = %caller.username, "user deleted");
        Ok(())
    }

    /// PUT/PATCH /users/{id} : admin ou l'utilisateur lui-même
    pub async fn update(
        db: &DatabaseConnection,
        config: &AppConfig,
        caller: &AuthUser,
        method: &Method,
        id: i32,
        patch: UserPatch,
    ) -> Result<users::Model, ApiError> {
        let patch = validated(patch)?;
        let user = Self::find(db, id).await?;

        OwnerOrAdmin::has_object_permission(method, Some(caller), Some(user.id))?;

        if patch.touches_admin_fields() && !caller.is_admin() {
            return Err(ApiError::Forbidden("Only admins can change role or verification".to_string()));
        }
        if let Some(role) = patch.role {
            if role != user.role {
                Self::ensure_not_protected(config, &user)?;
            }
        }

        let email = patch.email.as_deref().map(normalize_email);
        let username = patch.username.as_deref().map(normalize_username).transpose()?;

        let mut errors = FieldErrors::new();
        if let Some(email) = &email {
            if AuthService::email_taken(db, email, Some(user.id)).await? {
                errors.insert("email".to_string(), vec!["A user with this email already exists".to_string()]);
            }
        }
        if let Some(username) = &username {
            // Renommer un compte protégé lui ferait perdre sa protection
            if *username != user.username {
                Self::ensure_not_protected(config, &user)?;
            }
            if AuthService::username_taken(db, username, Some(user.id)).await? {
                errors.insert("username".to_string(), vec!["A user with this username already exists".to_string()]);
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let password_hash = match &patch.password {
            Some(raw) => Some(password::hash_password(raw, config.password_iterations)?),
            None => None,
        };

        let mut model: users::ActiveModel = user.into();
        if let Some(email) = email {
            model.email = Set(email);
        }
        if let Some(username) = username {
            model.username = Set(username);
        }
        if let Some(hash) = password_hash {
            model.password_hash = Set(hash);
        }
        if let Some(cv) = patch.cv {
            model.cv = Set(cv);
        }
        if let Some(is_verified) = patch.is_verified {
            model.is_verified = Set(is_verified);
        }
        if let Some(role) = patch.role {
            model.role = Set(role);
        }

        let user = model.update(db).await?;
        tracing::info!(target_id = user.id, by = %caller.username, "user updated");
        Ok(user)
    }

    /// Garantit l'existence du compte admin configuré (ADMIN_EMAIL...).
    /// Un compte existant est promu et réactivé, son mot de passe conservé.
    pub async fn ensure_admin(
        db: &DatabaseConnection,
        config: &AppConfig,
        admin: &BootstrapAdmin,
    ) -> Result<users::Model, ApiError> {
        let email = normalize_email(&admin.email);

        let existing = Users::find()
            .filter(
                UserColumn::Email
                    .eq(email.as_str())
                    .or(UserColumn::Username.eq(admin.username.as_str())),
            )
            .one(db)
            .await?;

        if let Some(user) = existing {
            let mut model: users::ActiveModel = user.into();
            model.role = Set(Role::Admin);
            model.is_active = Set(true);
            model.is_verified = Set(true);
            let user = model.update(db).await?;
            tracing::info!(username = %user.username, "bootstrap admin already present");
            return Ok(user);
        }

        let password_hash = password::hash_password(&admin.password, config.password_iterations)?;
        let user = users::ActiveModel {
            email: Set(email),
            username: Set(admin.username.clone()),
            password_hash: Set(password_hash),
            role: Set(Role::Admin),
            is_active: Set(true),
            is_verified: Set(true),
            cv: Set(None),
            ip_address: Set(None),
            last_login: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(username = %user.username, "bootstrap admin created");
        Ok(user)
    }
}

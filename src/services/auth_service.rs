use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};

use crate::config::AppConfig;
use crate::dto::user::{LoginRequest, RegisterRequest};
use crate::dto::validated;
use crate::error::{ApiError, FieldErrors};
use crate::middleware::AuthUser;
use crate::models::token_blacklist::{self, Entity as TokenBlacklist, Column as BlacklistColumn};
use crate::models::users::{self, Entity as Users, Column as UserColumn, Role};
use crate::utils::jwt::{self, TokenPair, TokenType};
use crate::utils::password;

pub struct AuthService;

/// Les emails sont comparés sans tenir compte de la casse
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Username sans espaces autour ; vide après trim = refusé
pub fn normalize_username(username: &str) -> Result<String, ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::field("username", "username must not be blank"));
    }
    Ok(username.to_string())
}

impl AuthService {
    /// Crée un compte guest. Aucun enregistrement si une validation échoue.
    pub async fn register(
        db: &DatabaseConnection,
        config: &AppConfig,
        request: RegisterRequest,
        ip_address: Option<String>,
    ) -> Result<users::Model, ApiError> {
        let request = validated(request)?;
        let email = normalize_email(&request.email);
        let username = normalize_username(&request.username)?;

        // 1. Unicité email / username avant toute écriture
        let mut errors = FieldErrors::new();
        if Self::email_taken(db, &email, None).await? {
            errors.insert("email".to_string(), vec!["A user with this email already exists".to_string()]);
        }
        if Self::username_taken(db, &username, None).await? {
            errors.insert("username".to_string(), vec!["A user with this username already exists".to_string()]);
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        // 2. Hash le mot de passe
        let password_hash = password::hash_password(&request.password, config.password_iterations)?;

        // 3. Créer l'utilisateur
        let new_user = users::ActiveModel {
            email: Set(email),
            username: Set(username),
            password_hash: Set(password_hash),
            role: Set(Role::Guest),
            is_active: Set(true),
            is_verified: Set(false),
            cv: Set(None),
            ip_address: Set(ip_address),
            last_login: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        match new_user.insert(db).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "user registered");
                Ok(user)
            }
            // Inscription concurrente avec le même email/username
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
                ApiError::field("email", "A user with this email or username already exists"),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Vérifie email + mot de passe puis émet la paire access/refresh
    pub async fn login(
        db: &DatabaseConnection,
        config: &AppConfig,
        request: LoginRequest,
    ) -> Result<(users::Model, TokenPair), ApiError> {
        let email = normalize_email(&request.email);

        // 1. Trouver l'utilisateur
        let Some(user) = Users::find()
            .filter(UserColumn::Email.eq(&email))
            .one(db)
            .await?
        else {
            tracing::warn!(email = %email, "login failed: unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        // 2. Vérifier le mot de passe
        if !password::verify_password(&request.password, &user.password_hash)? {
            tracing::warn!(user_id = user.id, "login failed: wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        // 3. Compte suspendu
        if !user.is_active {
            tracing::warn!(user_id = user.id, "login refused: account suspended");
            return Err(ApiError::AccountSuspended);
        }

        // 4. Générer les JWT
        let tokens = jwt::generate_pair(config, &user)?;

        let mut active: users::ActiveModel = user.into();
        active.last_login = Set(Some(Utc::now()));
        let user = active.update(db).await?;

        tracing::info!(user_id = user.id, "user logged in");
        Ok((user, tokens))
    }

    /// Échange un refresh token valide et non révoqué contre un access token
    pub async fn refresh(
        db: &DatabaseConnection,
        config: &AppConfig,
        refresh_token: &str,
    ) -> Result<String, ApiError> {
        let claims = jwt::verify_token(config, refresh_token, TokenType::Refresh)?;

        if Self::is_blacklisted(db, &claims.jti).await? {
            tracing::warn!(user_id = claims.sub, "refresh refused: token blacklisted");
            return Err(ApiError::InvalidToken);
        }

        let user = Users::find_by_id(claims.sub)
            .one(db)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        if !user.is_active {
            return Err(ApiError::AccountSuspended);
        }

        // Le rôle vient de la base : une promotion est visible dès le refresh
        let access = jwt::generate_token(config, user.id, &user.username, user.role, TokenType::Access)?;
        Ok(access)
    }

    /// Ajoute le refresh token à la blacklist (sans effet s'il y est déjà)
    pub async fn logout(
        db: &DatabaseConnection,
        config: &AppConfig,
        caller: &AuthUser,
        refresh_token: &str,
    ) -> Result<(), ApiError> {
        let claims = jwt::verify_token(config, refresh_token, TokenType::Refresh)
            .map_err(|_| ApiError::BadRequest("Token is invalid or expired".to_string()))?;

        if claims.sub != caller.user_id {
            return Err(ApiError::BadRequest(
                "Token does not belong to the authenticated user".to_string(),
            ));
        }

        if Self::is_blacklisted(db, &claims.jti).await? {
            return Ok(());
        }

        let entry = token_blacklist::ActiveModel {
            jti: Set(claims.jti.clone()),
            user_id: Set(Some(claims.sub)),
            expires_at: Set(claims.expires_at()),
            blacklisted_at: Set(Utc::now()),
            ..Default::default()
        };

        match entry.insert(db).await {
            Ok(_) => {}
            // Logout concurrent du même token
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {}
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = caller.user_id, "refresh token blacklisted");
        Ok(())
    }

    pub async fn is_blacklisted(db: &DatabaseConnection, jti: &str) -> Result<bool, ApiError> {
        let entry = TokenBlacklist::find()
            .filter(BlacklistColumn::Jti.eq(jti))
            .one(db)
            .await?;
        Ok(entry.is_some())
    }

    /// `except` : l'utilisateur en cours de modification
    pub async fn email_taken(db: &DatabaseConnection, email: &str, except: Option<i32>) -> Result<bool, ApiError> {
        let mut query = Users::find().filter(UserColumn::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(UserColumn::Id.ne(id));
        }
        Ok(query.one(db).await?.is_some())
    }

    pub async fn username_taken(db: &DatabaseConnection, username: &str, except: Option<i32>) -> Result<bool, ApiError> {
        let mut query = Users::find().filter(UserColumn::Username.eq(username));
        if let Some(id) = except {
            query = query.filter(UserColumn::Id.ne(id));
        }
        Ok(query.one(db).await?.is_some())
    }
}

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, decode, Header, Validation, EncodingKey, DecodingKey, Algorithm};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::users::{self, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,        // user_id
    pub username: String,
    pub role: Role,
    pub token_type: TokenType,
    pub jti: String,     // identifiant unique (blacklist)
    pub iat: i64,
    pub exp: i64,        // expiration timestamp
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to generate token: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("Invalid token: {0}")]
    Decode(jsonwebtoken::errors::Error),

    #[error("Invalid token: expected a {expected:?} token")]
    WrongType { expected: TokenType },
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encode(e) => ApiError::Internal(e.to_string()),
            TokenError::Decode(_) | TokenError::WrongType { .. } => ApiError::InvalidToken,
        }
    }
}

/// Access token (courte durée) + refresh token (longue durée)
#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Génère un JWT signé HS256 pour un utilisateur
pub fn generate_token(
    config: &AppConfig,
    user_id: i32,
    username: &str,
    role: Role,
    token_type: TokenType,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let ttl = match token_type {
        TokenType::Access => config.access_token_ttl,
        TokenType::Refresh => config.refresh_token_ttl,
    };

    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        token_type,
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
        .map_err(TokenError::Encode)
}

/// Génère la paire access/refresh pour un utilisateur
pub fn generate_pair(config: &AppConfig, user: &users::Model) -> Result<TokenPair, TokenError> {
    Ok(TokenPair {
        access: generate_token(config, user.id, &user.username, user.role, TokenType::Access)?,
        refresh: generate_token(config, user.id, &user.username, user.role, TokenType::Refresh)?,
    })
}

/// Vérifie signature, expiration et type du token
pub fn verify_token(config: &AppConfig, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
        .map(|data| data.claims)
        .map_err(TokenError::Decode)?;

    if claims.token_type != expected {
        return Err(TokenError::WrongType { expected });
    }

    Ok(claims)
}

// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Paramètres du serveur lus depuis l'environnement (fichier .env chargé
//   par dotenv dans main.rs).
//
// Variables:
//   - DATABASE_URL (obligatoire) : postgres://... ou sqlite://...
//   - BIND_ADDR : défaut 127.0.0.1:8080
//   - JWT_SECRET : clé HS256 (défaut non sécurisé + warning)
//   - ACCESS_TOKEN_TTL_MINUTES : défaut 5
//   - REFRESH_TOKEN_TTL_DAYS : défaut 1
//   - PROTECTED_USERNAMES : liste séparée par des virgules
//   - PASSWORD_HASH_ITERATIONS : défaut 260000
//   - ADMIN_EMAIL / ADMIN_USERNAME / ADMIN_PASSWORD : admin créé au démarrage
//
// ============================================================================

use std::collections::HashSet;
use std::env;

use chrono::{Duration, Utc};
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_JWT_SECRET: &str = "default-insecure-key-change-this";
const DEFAULT_PROTECTED_USERNAMES: &str = "admin1,superadmin";
pub const DEFAULT_PASSWORD_ITERATIONS: u32 = 260_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Compte administrateur à garantir au démarrage
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub protected_usernames: HashSet<String>,
    pub password_iterations: u32,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture
    /// (l'environnement en production, une map dans les tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not found in .env, using default (INSECURE)");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let access_token_ttl = ttl(
            "ACCESS_TOKEN_TTL_MINUTES",
            lookup("ACCESS_TOKEN_TTL_MINUTES"),
            5,
            Duration::try_minutes,
        )?;
        let refresh_token_ttl = ttl(
            "REFRESH_TOKEN_TTL_DAYS",
            lookup("REFRESH_TOKEN_TTL_DAYS"),
            1,
            Duration::try_days,
        )?;

        let raw_iterations = lookup("PASSWORD_HASH_ITERATIONS");
        let password_iterations = parse_or(
            "PASSWORD_HASH_ITERATIONS",
            raw_iterations.clone(),
            DEFAULT_PASSWORD_ITERATIONS,
        )?;
        if password_iterations == 0 {
            return Err(ConfigError::Invalid {
                name: "PASSWORD_HASH_ITERATIONS",
                value: raw_iterations.unwrap_or_default(),
            });
        }

        let protected = lookup("PROTECTED_USERNAMES")
            .unwrap_or_else(|| DEFAULT_PROTECTED_USERNAMES.to_string());

        let bootstrap_admin = match (
            lookup("ADMIN_EMAIL"),
            lookup("ADMIN_USERNAME"),
            lookup("ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(username), Some(password)) => Some(BootstrapAdmin {
                email,
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
            protected_usernames: parse_username_list(&protected),
            password_iterations,
            bootstrap_admin,
        })
    }

    /// Un "predefined admin" ne peut être ni supprimé, ni suspendu,
    /// ni changer de rôle.
    pub fn is_protected(&self, username: &str) -> bool {
        self.protected_usernames.contains(username)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

/// Durée strictement positive, ajoutable à la date courante sans débordement
fn ttl(
    name: &'static str,
    raw: Option<String>,
    default: i64,
    build: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    let amount = parse_or(name, raw.clone(), default)?;
    match build(amount) {
        Some(duration) if amount > 0 && Utc::now().checked_add_signed(duration).is_some() => Ok(duration),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw.unwrap_or_else(|| amount.to_string()),
        }),
    }
}

fn parse_username_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

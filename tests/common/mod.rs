#![allow(dead_code)]

use std::collections::HashMap;

use atsweb_backend::config::AppConfig;
use atsweb_backend::db;
use atsweb_backend::models::users::{self, Role};
use atsweb_backend::utils::{jwt, password};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

pub const PASSWORD: &str = "secret123";

/// Crée l'application de test (mêmes middlewares que main.rs)
macro_rules! test_app {
    ($db:expr, $config:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($db.clone()))
                .app_data(actix_web::web::Data::new($config.clone()))
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure(atsweb_backend::routes::configure_routes),
        )
        .await
    };
}

pub fn test_config() -> AppConfig {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "sqlite::memory:"),
        ("JWT_SECRET", "test-secret"),
        ("PASSWORD_HASH_ITERATIONS", "1000"),
        ("PROTECTED_USERNAMES", "admin1,superadmin"),
    ]);

    AppConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
        .expect("Failed to build test config")
}

pub async fn setup() -> (DatabaseConnection, AppConfig) {
    let config = test_config();
    let db = db::establish_connection(&config.database_url)
        .await
        .expect("Failed to open test database");
    (db, config)
}

/// Insère un utilisateur directement en base (mot de passe = PASSWORD)
pub async fn seed_user(
    db: &DatabaseConnection,
    config: &AppConfig,
    username: &str,
    role: Role,
) -> users::Model {
    users::ActiveModel {
        email: Set(format!("{}@example.com", username)),
        username: Set(username.to_string()),
        password_hash: Set(password::hash_password(PASSWORD, config.password_iterations).unwrap()),
        role: Set(role),
        is_active: Set(true),
        is_verified: Set(false),
        cv: Set(None),
        ip_address: Set(None),
        last_login: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

pub fn access_token(config: &AppConfig, user: &users::Model) -> String {
    jwt::generate_pair(config, user).unwrap().access
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

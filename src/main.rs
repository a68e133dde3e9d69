use actix_web::{App, HttpServer, middleware::NormalizePath, web};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use atsweb_backend::config::AppConfig;
use atsweb_backend::services::user_service::UserService;
use atsweb_backend::{db, routes};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    tracing::info!("Connecting to database...");
    let db = db::establish_connection(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if let Some(admin) = &config.bootstrap_admin {
        UserService::ensure_admin(&db, &config, admin)
            .await
            .context("Failed to create admin account")?;
    }

    let bind_addr = config.bind_addr.clone();
    tracing::info!("Starting server on http://{}", bind_addr);

    let db = web::Data::new(db);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .app_data(config.clone())
            .wrap(NormalizePath::trim())
            .configure(routes::configure_routes)
    })
        .bind(bind_addr.as_str())
        .with_context(|| format!("Failed to bind {}", bind_addr))?
        .run()
        .await?;

    Ok(())
}

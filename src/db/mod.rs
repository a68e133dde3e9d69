// connexion BD + migrations

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

pub mod migrator;

/// Ouvre le pool et applique les migrations.
/// Une base SQLite en mémoire n'existe que pour une connexion :
/// le pool est alors limité à 1.
pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_string());

    if database_url.contains(":memory:") {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(10).min_connections(1);
    }

    opt.connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;

    migrator::Migrator::up(&db, None).await?;
    tracing::info!("Database connected & migrations applied");

    Ok(db)
}

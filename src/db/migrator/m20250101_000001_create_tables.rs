use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

use crate::models::{
    article, candidature, realisation, realisation_technology, service, technology, temoignage,
    token_blacklist, users,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Crée une table à partir de son entité (colonnes, index uniques et
/// clés étrangères avec leur politique ON DELETE).
async fn create<E: EntityTrait>(manager: &SchemaManager<'_>, schema: &Schema, entity: E) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Ordre : les tables référencées avant les tables qui les référencent
        create(manager, &schema, users::Entity).await?;
        create(manager, &schema, technology::Entity).await?;
        create(manager, &schema, service::Entity).await?;
        create(manager, &schema, realisation::Entity).await?;
        create(manager, &schema, realisation_technology::Entity).await?;
        create(manager, &schema, article::Entity).await?;
        create(manager, &schema, temoignage::Entity).await?;
        create(manager, &schema, candidature::Entity).await?;
        create(manager, &schema, token_blacklist::Entity).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(token_blacklist::Entity).to_owned()).await?;
        manager.drop_table(Table::drop().table(candidature::Entity).to_owned()).await?;
        manager.drop_table(Table::drop().table(temoignage::Entity).to_owned()).await?;
        manager.drop_table(Table::drop().table(article::Entity).to_owned()).await?;
        manager.drop_table(Table::drop().table(realisation_technology::Entity).to_owned()).await?;
        manager.drop_table(Table::drop().table(realisation::Entity).to_owned()).await?;
        manager.drop_table(Table::drop().table(service::Entity).to_owned()).await?;
        manager.drop_table(Table::drop().table(technology::Entity).to_owned()).await?;
        manager.drop_table(Table::drop().table(users::Entity).to_owned()).await?;

        Ok(())
    }
}

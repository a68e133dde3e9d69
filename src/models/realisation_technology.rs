use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Table de liaison. Remplacée en bloc à chaque écriture d'une réalisation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "realisation_technologies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub realisation_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub technology_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::realisation::Entity",
        from = "Column::RealisationId",
        to = "super::realisation::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Realisation,

    #[sea_orm(
        belongs_to = "super::technology::Entity",
        from = "Column::TechnologyId",
        to = "super::technology::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Technology,
}

impl Related<super::realisation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Realisation.def()
    }
}

impl Related<super::technology::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Technology.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "technologies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::realisation_technology::Entity")]
    RealisationTechnology,
}

impl Related<super::realisation_technology::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RealisationTechnology.def()
    }
}

impl Related<super::realisation::Entity> for Entity {
    fn to() -> RelationDef {
        super::realisation_technology::Relation::Realisation.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::realisation_technology::Relation::Technology.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

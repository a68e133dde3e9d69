use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub titre: String,
    pub img: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub heure_cree: DateTimeUtc,
    pub heure_modifiee: DateTimeUtc,
    pub auteur_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuteurId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Auteur,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Auteur.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;

/// Rôle d'un compte : guest -> user -> admin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "guest")]
    Guest,
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        match self {
            Role::Admin => true,
            Role::Guest | Role::User => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Format: pbkdf2:sha256:iterations$salt$hash
    pub role: Role,
    pub is_active: bool,
    pub is_verified: bool,
    pub cv: Option<String>, // Référence du fichier (stockage hors API)
    pub ip_address: Option<String>,
    pub last_login: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::candidature::Entity")]
    Candidature,

    #[sea_orm(has_many = "super::service::Entity")]
    Service,

    #[sea_orm(has_many = "super::realisation::Entity")]
    Realisation,

    #[sea_orm(has_many = "super::article::Entity")]
    Article,

    #[sea_orm(has_many = "super::temoignage::Entity")]
    Temoignage,
}

impl Related<super::candidature::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Candidature.def()
    }
}

impl Related<super::service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl Related<super::realisation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Realisation.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl Related<super::temoignage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Temoignage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

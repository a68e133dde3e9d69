// ============================================================================
// MODÈLE : TOKEN BLACKLIST
// ============================================================================
//
// Description:
//   Refresh tokens révoqués par POST /api/auth/logout. Un jti présent ici
//   ne peut plus générer d'access token.
//
// Points d'attention:
//   - Table en ajout seul : aucune purge des entrées expirées
//   - ON DELETE SET NULL : l'entrée survit à la suppression du user
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token_blacklist")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub jti: String,

    pub user_id: Option<i32>,

    pub expires_at: DateTimeUtc,

    pub blacklisted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use std::collections::{HashMap, HashSet};

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

use crate::error::ApiError;
use crate::models::users::{Column as UserColumn, Entity as Users};

/// user_id -> username pour les listes (une seule requête au lieu de N)
pub async fn usernames_by_id<C, I>(db: &C, ids: I) -> Result<HashMap<i32, String>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Option<i32>>,
{
    let ids: HashSet<i32> = ids.into_iter().flatten().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = Users::find()
        .filter(UserColumn::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(users.into_iter().map(|u| (u.id, u.username)).collect())
}

/// Auteur demandé dans le corps (doit exister), sinon `fallback`
pub async fn resolve_author<C: ConnectionTrait>(
    db: &C,
    requested: Option<i32>,
    fallback: Option<i32>,
) -> Result<Option<i32>, ApiError> {
    let Some(id) = requested else {
        return Ok(fallback);
    };

    match Users::find_by_id(id).one(db).await? {
        Some(_) => Ok(Some(id)),
        None => Err(ApiError::field("auteur", format!("User {} does not exist", id))),
    }
}

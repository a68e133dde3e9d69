use sea_orm::{DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, Select};

use crate::dto::{ListQuery, PageMeta};
use crate::error::ApiError;

/// Résultat d'une requête de liste, paginée ou non
pub struct Listing<M> {
    pub items: Vec<M>,
    pub meta: Option<PageMeta>,
}

/// Exécute `select` (déjà trié) en appliquant ?page=&page_size= si présents
pub async fn fetch<E>(
    select: Select<E>,
    query: &ListQuery,
    db: &DatabaseConnection,
) -> Result<Listing<E::Model>, ApiError>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Sized + Send + Sync + 'static,
{
    match query.pagination()? {
        None => Ok(Listing {
            items: select.all(db).await?,
            meta: None,
        }),
        Some((page, page_size)) => {
            let paginator = select.paginate(db, page_size);
            let count = paginator.num_items().await?;
            let items = paginator.fetch_page(page).await?;

            Ok(Listing {
                items,
                meta: Some(PageMeta {
                    count,
                    page: page + 1,
                    page_size,
                }),
            })
        }
    }
}

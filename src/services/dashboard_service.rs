use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;

use crate::models::{article, candidature, realisation, service, technology, temoignage};
use crate::models::users::{Entity as Users, Column as UserColumn, Role};

const RECENT_USERS_DAYS: i64 = 30;

#[derive(Debug, Serialize)]
pub struct RoleCounts {
    pub guest: u64,
    pub user: u64,
    pub admin: u64,
}

#[derive(Debug, Serialize)]
pub struct UserStats {
    pub total: u64,
    pub joined_last_30_days: u64,
    pub active: u64,
    pub suspended: u64,
    pub by_role: RoleCounts,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub users: UserStats,
    pub services: u64,
    pub technologies: u64,
    pub realisations: u64,
    pub articles: u64,
    pub temoignages: u64,
    pub candidatures: u64,
}

pub struct DashboardService;

impl DashboardService {
    /// Compteurs calculés à chaque appel (pas de cache)
    pub async fn stats(db: &DatabaseConnection) -> Result<DashboardStats, DbErr> {
        let since = Utc::now() - Duration::days(RECENT_USERS_DAYS);

        let users = UserStats {
            total: Users::find().count(db).await?,
            joined_last_30_days: Users::find()
                .filter(UserColumn::CreatedAt.gte(since))
                .count(db)
                .await?,
            active: Users::find().filter(UserColumn::IsActive.eq(true)).count(db).await?,
            suspended: Users::find().filter(UserColumn::IsActive.eq(false)).count(db).await?,
            by_role: RoleCounts {
                guest: Self::count_role(db, Role::Guest).await?,
                user: Self::count_role(db, Role::User).await?,
                admin: Self::count_role(db, Role::Admin).await?,
            },
        };

        Ok(DashboardStats {
            users,
            services: service::Entity::find().count(db).await?,
            technologies: technology::Entity::find().count(db).await?,
            realisations: realisation::Entity::find().count(db).await?,
            articles: article::Entity::find().count(db).await?,
            temoignages: temoignage::Entity::find().count(db).await?,
            candidatures: candidature::Entity::find().count(db).await?,
        })
    }

    async fn count_role(db: &DatabaseConnection, role: Role) -> Result<u64, DbErr> {
        Users::find().filter(UserColumn::Role.eq(role)).count(db).await
    }
}

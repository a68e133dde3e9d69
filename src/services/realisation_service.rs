use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};

use crate::error::ApiError;
use crate::models::realisation;
use crate::models::realisation_technology::{self, Entity as RealisationTechnology, Column as LinkColumn};
use crate::models::technology::{self, Entity as Technology, Column as TechnologyColumn};

pub struct RealisationService;

impl RealisationService {
    /// realisation_id -> technologies (triées par nom)
    pub async fn technologies_for<C: ConnectionTrait>(
        db: &C,
        realisation_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<technology::Model>>, ApiError> {
        if realisation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = RealisationTechnology::find()
            .filter(LinkColumn::RealisationId.is_in(realisation_ids.to_vec()))
            .all(db)
            .await?;

        let technology_ids: BTreeSet<i32> = links.iter().map(|l| l.technology_id).collect();
        let technologies: HashMap<i32, technology::Model> = Technology::find()
            .filter(TechnologyColumn::Id.is_in(technology_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let mut by_realisation: HashMap<i32, Vec<technology::Model>> = HashMap::new();
        for link in links {
            if let Some(tech) = technologies.get(&link.technology_id) {
                by_realisation.entry(link.realisation_id).or_default().push(tech.clone());
            }
        }
        for techs in by_realisation.values_mut() {
            techs.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(by_realisation)
    }

    /// Écrit la réalisation (insert si pas d'id, update sinon) et, si
    /// `technology_ids` est fourni, remplace toutes ses associations dans la
    /// même transaction.
    pub async fn save(
        db: &DatabaseConnection,
        active: realisation::ActiveModel,
        technology_ids: Option<&[i32]>,
    ) -> Result<(realisation::Model, Vec<technology::Model>), ApiError> {
        let technology_ids: Option<Vec<i32>> = technology_ids
            .map(|ids| ids.iter().copied().collect::<BTreeSet<i32>>().into_iter().collect());

        if let Some(ids) = &technology_ids {
            Self::ensure_technologies_exist(db, ids).await?;
        }

        let txn = db.begin().await?;

        let model = if matches!(active.id, ActiveValue::NotSet) {
            active.insert(&txn).await?
        } else {
            active.update(&txn).await?
        };

        if let Some(ids) = &technology_ids {
            RealisationTechnology::delete_many()
                .filter(LinkColumn::RealisationId.eq(model.id))
                .exec(&txn)
                .await?;

            if !ids.is_empty() {
                let links = ids.iter().map(|technology_id| realisation_technology::ActiveModel {
                    realisation_id: Set(model.id),
                    technology_id: Set(*technology_id),
                });
                RealisationTechnology::insert_many(links)
                    .exec_without_returning(&txn)
                    .await?;
            }
        }

        let technologies = Self::technologies_for(&txn, &[model.id])
            .await?
            .remove(&model.id)
            .unwrap_or_default();

        txn.commit().await?;

        Ok((model, technologies))
    }

    async fn ensure_technologies_exist(db: &DatabaseConnection, ids: &[i32]) -> Result<(), ApiError> {
        if ids.is_empty() {
            return Ok(());
        }

        let found: BTreeSet<i32> = Technology::find()
            .filter(TechnologyColumn::Id.is_in(ids.to_vec()))
            .all(db)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found.contains(id))
            .map(|id| id.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::field(
                "technologies",
                format!("Unknown technology ids: {}", missing.join(", ")),
            ))
        }
    }
}

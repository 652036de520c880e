//! Trophy catalog and award repository.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{trophy_definitions, user_trophies};

/// Repository for trophy definitions and per-user awards.
#[derive(Debug, Clone)]
pub struct TrophyRepository {
    db: DatabaseConnection,
}

impl TrophyRepository {
    /// Creates a new trophy repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The full trophy catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn catalog(&self) -> Result<Vec<trophy_definitions::Model>, DbErr> {
        trophy_definitions::Entity::find().all(&self.db).await
    }

    /// IDs of trophies a user has already earned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn earned_ids(&self, user_id: Uuid) -> Result<Vec<String>, DbErr> {
        user_trophies::Entity::find()
            .filter(user_trophies::Column::UserId.eq(user_id))
            .select_only()
            .column(user_trophies::Column::TrophyId)
            .into_tuple::<String>()
            .all(&self.db)
            .await
    }

    /// Awards trophies to a user, skipping any already held. Returns the
    /// number of newly inserted awards, so a replayed sync reports zero.
    ///
    /// # Errors
    ///
    /// Returns an error if a database write fails.
    pub async fn award(&self, user_id: Uuid, trophy_ids: &[&str]) -> Result<usize, DbErr> {
        let now = chrono::Utc::now().into();
        let mut awarded = 0;

        for trophy_id in trophy_ids {
            let row = user_trophies::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                trophy_id: Set((*trophy_id).to_string()),
                earned_at: Set(now),
            };

            let result = user_trophies::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([
                        user_trophies::Column::UserId,
                        user_trophies::Column::TrophyId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec(&self.db)
                .await;

            match result {
                Ok(_) => awarded += 1,
                Err(DbErr::RecordNotInserted) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(awarded)
    }

    /// Replaces the trophy catalog rows matching the given definitions,
    /// inserting new IDs and updating existing ones. Used by the seeder.
    ///
    /// # Errors
    ///
    /// Returns an error if a database write fails.
    pub async fn upsert_definitions(
        &self,
        defs: Vec<trophy_definitions::ActiveModel>,
    ) -> Result<(), DbErr> {
        for def in defs {
            trophy_definitions::Entity::insert(def)
                .on_conflict(
                    OnConflict::column(trophy_definitions::Column::Id)
                        .update_columns([
                            trophy_definitions::Column::Tier,
                            trophy_definitions::Column::Xp,
                            trophy_definitions::Column::RuleKey,
                            trophy_definitions::Column::RuleOp,
                            trophy_definitions::Column::RuleValue,
                        ])
                        .to_owned(),
                )
                .exec(&self.db)
                .await?;
        }
        Ok(())
    }
}

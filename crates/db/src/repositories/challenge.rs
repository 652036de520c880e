//! Challenge progress repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::challenge_progress;

/// Fields written when progress is recorded for a challenge.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// active | completed.
    pub status: String,
    /// XP banked so far; only counts toward the total once completed.
    pub xp_earned: i32,
    /// Green days accumulated while following the process.
    pub process_green_days: i32,
}

/// Repository for per-user challenge progress rows.
#[derive(Debug, Clone)]
pub struct ChallengeRepository {
    db: DatabaseConnection,
}

impl ChallengeRepository {
    /// Creates a new challenge repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All progress rows for a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<challenge_progress::Model>, DbErr> {
        challenge_progress::Entity::find()
            .filter(challenge_progress::Column::UserId.eq(user_id))
            .order_by_asc(challenge_progress::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Records progress for `(user_id, challenge_id)`, inserting on first
    /// touch. Completed rows are frozen and never overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn record_progress(
        &self,
        user_id: Uuid,
        challenge_id: &str,
        update: ProgressUpdate,
    ) -> Result<challenge_progress::Model, DbErr> {
        let now = chrono::Utc::now().into();

        let existing = challenge_progress::Entity::find()
            .filter(challenge_progress::Column::UserId.eq(user_id))
            .filter(challenge_progress::Column::ChallengeId.eq(challenge_id))
            .one(&self.db)
            .await?;

        match existing {
            Some(row) if row.status == "completed" => Ok(row),
            Some(row) => {
                let mut active = row.into_active_model();
                active.status = Set(update.status);
                active.xp_earned = Set(update.xp_earned);
                active.process_green_days = Set(update.process_green_days);
                active.updated_at = Set(now);
                active.update(&self.db).await
            }
            None => {
                let row = challenge_progress::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    challenge_id: Set(challenge_id.to_string()),
                    status: Set(update.status),
                    xp_earned: Set(update.xp_earned),
                    process_green_days: Set(update.process_green_days),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                row.insert(&self.db).await
            }
        }
    }
}

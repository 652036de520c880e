//! Preference repository: per-user settings, upsert-only.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, Set,
};
use uuid::Uuid;

use crate::entities::preferences;

/// Partial preference update; omitted fields are left unchanged.
#[derive(Debug, Default, Clone)]
pub struct PreferencePatch {
    /// New theme, if provided.
    pub theme: Option<String>,
    /// New locale, if provided.
    pub locale: Option<String>,
    /// New active account. `Some(None)` explicitly clears the selection.
    pub active_account_id: Option<Option<Uuid>>,
}

/// Repository for the one-row-per-user preferences table.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    db: DatabaseConnection,
}

impl PreferenceRepository {
    /// Creates a new preference repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fetches a user's preferences, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, user_id: Uuid) -> Result<Option<preferences::Model>, DbErr> {
        preferences::Entity::find_by_id(user_id).one(&self.db).await
    }

    /// Upserts preferences, applying only the fields present in the patch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        patch: PreferencePatch,
    ) -> Result<preferences::Model, DbErr> {
        let now = chrono::Utc::now().into();

        match self.get(user_id).await? {
            Some(existing) => {
                let mut active = existing.into_active_model();
                if let Some(theme) = patch.theme {
                    active.theme = Set(theme);
                }
                if let Some(locale) = patch.locale {
                    active.locale = Set(locale);
                }
                if let Some(account) = patch.active_account_id {
                    active.active_account_id = Set(account);
                }
                active.updated_at = Set(now);
                active.update(&self.db).await
            }
            None => {
                let row = preferences::ActiveModel {
                    user_id: Set(user_id),
                    theme: Set(patch.theme.unwrap_or_else(|| "dark".to_string())),
                    locale: Set(patch.locale.unwrap_or_else(|| "en".to_string())),
                    active_account_id: Set(patch.active_account_id.flatten()),
                    updated_at: Set(now),
                };
                row.insert(&self.db).await
            }
        }
    }

    /// The user's active trading account, if selected.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn active_account_id(&self, user_id: Uuid) -> Result<Option<Uuid>, DbErr> {
        Ok(self.get(user_id).await?.and_then(|p| p.active_account_id))
    }

    /// Sets the active trading account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn set_active_account(
        &self,
        user_id: Uuid,
        account_id: Option<Uuid>,
    ) -> Result<(), DbErr> {
        self.upsert(
            user_id,
            PreferencePatch {
                active_account_id: Some(account_id),
                ..PreferencePatch::default()
            },
        )
        .await?;
        Ok(())
    }
}

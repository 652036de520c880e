//! Journal repository: one entry per user per calendar day.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::journal_entries;

/// Fields written on a journal upsert. The `(user, date)` pair is the key;
/// everything else replaces the prior day's values.
#[derive(Debug, Clone)]
pub struct JournalEntryInput {
    /// Trading account the entry belongs to, if scoped.
    pub account_id: Option<Uuid>,
    /// Calendar day of the entry.
    pub entry_date: NaiveDate,
    /// Realized profit or loss for the day.
    pub pnl: Decimal,
    /// Instrument symbol.
    pub instrument: Option<String>,
    /// long | short.
    pub direction: Option<String>,
    /// Entry price.
    pub entry_price: Option<Decimal>,
    /// Exit price.
    pub exit_price: Option<Decimal>,
    /// Position size.
    pub size: Option<Decimal>,
    /// Screenshot URLs.
    pub screenshots: serde_json::Value,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Emotion tag.
    pub emotion: Option<String>,
    /// Arbitrary tags.
    pub tags: serde_json::Value,
    /// Whether the trading plan was respected.
    pub respected_plan: Option<bool>,
}

/// Repository for journal entries.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upserts the entry for `(user_id, entry.entry_date)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        entry: JournalEntryInput,
    ) -> Result<journal_entries::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let entry_date = entry.entry_date;
        let row = journal_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            account_id: Set(entry.account_id),
            entry_date: Set(entry.entry_date),
            pnl: Set(entry.pnl),
            instrument: Set(entry.instrument),
            direction: Set(entry.direction),
            entry_price: Set(entry.entry_price),
            exit_price: Set(entry.exit_price),
            size: Set(entry.size),
            screenshots: Set(entry.screenshots),
            notes: Set(entry.notes),
            emotion: Set(entry.emotion),
            tags: Set(entry.tags),
            respected_plan: Set(entry.respected_plan),
            created_at: Set(now),
            updated_at: Set(now),
        };

        journal_entries::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    journal_entries::Column::UserId,
                    journal_entries::Column::EntryDate,
                ])
                .update_columns([
                    journal_entries::Column::AccountId,
                    journal_entries::Column::Pnl,
                    journal_entries::Column::Instrument,
                    journal_entries::Column::Direction,
                    journal_entries::Column::EntryPrice,
                    journal_entries::Column::ExitPrice,
                    journal_entries::Column::Size,
                    journal_entries::Column::Screenshots,
                    journal_entries::Column::Notes,
                    journal_entries::Column::Emotion,
                    journal_entries::Column::Tags,
                    journal_entries::Column::RespectedPlan,
                    journal_entries::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        // Re-read; the conflict path keeps the original row id.
        self.find_by_date(user_id, entry_date).await?.ok_or_else(|| {
            DbErr::RecordNotFound(format!("journal entry for {entry_date} vanished after upsert"))
        })
    }

    /// The entry for a given day, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_date(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<journal_entries::Model>, DbErr> {
        journal_entries::Entity::find()
            .filter(journal_entries::Column::UserId.eq(user_id))
            .filter(journal_entries::Column::EntryDate.eq(date))
            .one(&self.db)
            .await
    }

    /// Lists entries in `[from, to]`, oldest first. Open bounds list all.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_range(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<journal_entries::Model>, DbErr> {
        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::UserId.eq(user_id));
        if let Some(from) = from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }
        query
            .order_by_asc(journal_entries::Column::EntryDate)
            .all(&self.db)
            .await
    }

    /// Deletes the entry for a given day. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn delete_by_date(&self, user_id: Uuid, date: NaiveDate) -> Result<bool, DbErr> {
        let result = journal_entries::Entity::delete_many()
            .filter(journal_entries::Column::UserId.eq(user_id))
            .filter(journal_entries::Column::EntryDate.eq(date))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Total journal entries for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_entries(&self, user_id: Uuid) -> Result<u64, DbErr> {
        journal_entries::Entity::find()
            .filter(journal_entries::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
    }

    /// Days closed with positive PnL.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_green_days(&self, user_id: Uuid) -> Result<u64, DbErr> {
        journal_entries::Entity::find()
            .filter(journal_entries::Column::UserId.eq(user_id))
            .filter(journal_entries::Column::Pnl.gt(Decimal::ZERO))
            .count(&self.db)
            .await
    }

    /// Days where the trading plan was respected.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_plan_respected(&self, user_id: Uuid) -> Result<u64, DbErr> {
        journal_entries::Entity::find()
            .filter(journal_entries::Column::UserId.eq(user_id))
            .filter(journal_entries::Column::RespectedPlan.eq(true))
            .count(&self.db)
            .await
    }

    /// All distinct entry dates for a user, used for streak computation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn entry_dates(&self, user_id: Uuid) -> Result<Vec<NaiveDate>, DbErr> {
        journal_entries::Entity::find()
            .filter(journal_entries::Column::UserId.eq(user_id))
            .select_only()
            .column(journal_entries::Column::EntryDate)
            .order_by_asc(journal_entries::Column::EntryDate)
            .into_tuple::<NaiveDate>()
            .all(&self.db)
            .await
    }
}

//! Trading account repository with plan-gated creation and guarded deletion.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{journal_entries, trading_accounts};

/// Errors from trading account operations.
#[derive(Debug, Error)]
pub enum TradingAccountError {
    /// Plan allows no further accounts.
    #[error("plan limit of {limit} trading account(s) reached")]
    PlanLimitReached {
        /// The plan's account limit.
        limit: usize,
    },

    /// Account missing or not owned by the caller.
    #[error("trading account not found: {0}")]
    NotFound(Uuid),

    /// A user must keep at least one account.
    #[error("cannot delete the last remaining trading account")]
    LastAccount,

    /// The active account cannot be deleted; switch first.
    #[error("cannot delete the active trading account")]
    ActiveAccount,

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a trading account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account display name.
    pub name: String,
    /// Broker name.
    pub broker: String,
}

/// Why a deletion is refused, if it is.
#[derive(Debug, PartialEq, Eq)]
enum DeletionBlocker {
    Last,
    Active,
}

/// Deletion guard, ordered so the "last account" rule wins even when the
/// sole account is also the active one.
fn deletion_blocker(
    account_count: u64,
    account_id: Uuid,
    active_account_id: Option<Uuid>,
) -> Option<DeletionBlocker> {
    if account_count <= 1 {
        return Some(DeletionBlocker::Last);
    }
    if active_account_id == Some(account_id) {
        return Some(DeletionBlocker::Active);
    }
    None
}

/// Repository for trading accounts.
#[derive(Debug, Clone)]
pub struct TradingAccountRepository {
    db: DatabaseConnection,
}

impl TradingAccountRepository {
    /// Creates a new trading account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's accounts, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<trading_accounts::Model>, DbErr> {
        trading_accounts::Entity::find()
            .filter(trading_accounts::Column::UserId.eq(user_id))
            .order_by_asc(trading_accounts::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Finds an account owned by the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_owned(
        &self,
        user_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<trading_accounts::Model>, DbErr> {
        trading_accounts::Entity::find_by_id(account_id)
            .filter(trading_accounts::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Creates an account, enforcing the plan's account limit.
    ///
    /// The first account a user creates is flagged default. Returns the new
    /// account and whether it was the user's first (so the caller can also
    /// make it the active account).
    ///
    /// # Errors
    ///
    /// Returns `PlanLimitReached` when the user already holds `max_accounts`.
    pub async fn create_account(
        &self,
        user_id: Uuid,
        input: CreateAccountInput,
        max_accounts: usize,
    ) -> Result<(trading_accounts::Model, bool), TradingAccountError> {
        let existing = trading_accounts::Entity::find()
            .filter(trading_accounts::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        if existing as usize >= max_accounts {
            return Err(TradingAccountError::PlanLimitReached {
                limit: max_accounts,
            });
        }

        let is_first = existing == 0;
        let now = chrono::Utc::now().into();
        let account = trading_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name),
            broker: Set(input.broker),
            is_default: Set(is_first),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = account.insert(&self.db).await?;
        Ok((model, is_first))
    }

    /// Deletes an account after the business-rule guards pass.
    ///
    /// Account-scoped journal rows are removed first, then the account. If
    /// the deleted account was the default, the oldest remaining account is
    /// promoted so that exactly one default survives.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `LastAccount`, or `ActiveAccount` on guard
    /// failure.
    pub async fn delete_account(
        &self,
        user_id: Uuid,
        account_id: Uuid,
        active_account_id: Option<Uuid>,
    ) -> Result<(), TradingAccountError> {
        let Some(account) = self.find_owned(user_id, account_id).await? else {
            return Err(TradingAccountError::NotFound(account_id));
        };

        let count = trading_accounts::Entity::find()
            .filter(trading_accounts::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        match deletion_blocker(count, account_id, active_account_id) {
            Some(DeletionBlocker::Last) => return Err(TradingAccountError::LastAccount),
            Some(DeletionBlocker::Active) => return Err(TradingAccountError::ActiveAccount),
            None => {}
        }

        let was_default = account.is_default;

        let txn = self.db.begin().await?;

        journal_entries::Entity::delete_many()
            .filter(journal_entries::Column::AccountId.eq(account_id))
            .exec(&txn)
            .await?;

        trading_accounts::Entity::delete_by_id(account_id)
            .exec(&txn)
            .await?;

        if was_default {
            let remaining = trading_accounts::Entity::find()
                .filter(trading_accounts::Column::UserId.eq(user_id))
                .order_by_asc(trading_accounts::Column::CreatedAt)
                .one(&txn)
                .await?;
            if let Some(next_default) = remaining {
                let mut active = next_default.into_active_model();
                active.is_default = Set(true);
                active.updated_at = Set(chrono::Utc::now().into());
                active.update(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sole_account_blocked_even_when_not_active() {
        let id = Uuid::new_v4();
        assert_eq!(deletion_blocker(1, id, None), Some(DeletionBlocker::Last));
        // the "last account" rule also wins when it is the active one
        assert_eq!(
            deletion_blocker(1, id, Some(id)),
            Some(DeletionBlocker::Last)
        );
    }

    #[test]
    fn test_active_account_blocked() {
        let id = Uuid::new_v4();
        assert_eq!(
            deletion_blocker(2, id, Some(id)),
            Some(DeletionBlocker::Active)
        );
    }

    #[test]
    fn test_inactive_account_with_siblings_allowed() {
        let id = Uuid::new_v4();
        assert_eq!(deletion_blocker(2, id, Some(Uuid::new_v4())), None);
        assert_eq!(deletion_blocker(3, id, None), None);
    }
}

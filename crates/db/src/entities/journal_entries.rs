//! `SeaORM` Entity for the journal_entries table.
//!
//! One entry per user per calendar day, upserted on conflict.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Option<Uuid>,
    pub entry_date: Date,
    pub pnl: Decimal,
    pub instrument: Option<String>,
    /// long | short.
    pub direction: Option<String>,
    pub entry_price: Option<Decimal>,
    pub exit_price: Option<Decimal>,
    pub size: Option<Decimal>,
    /// Screenshot URLs.
    pub screenshots: Json,
    pub notes: Option<String>,
    pub emotion: Option<String>,
    pub tags: Json,
    pub respected_plan: Option<bool>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::trading_accounts::Entity",
        from = "Column::AccountId",
        to = "super::trading_accounts::Column::Id"
    )]
    TradingAccounts,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::trading_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradingAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

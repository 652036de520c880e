//! `SeaORM` Entity for the user_trophies table.
//!
//! At most one row per (user, trophy); inserts are idempotent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_trophies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub trophy_id: String,
    pub earned_at: DateTimeWithTimeZone,
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
        belongs_to = "super::trophy_definitions::Entity",
        from = "Column::TrophyId",
        to = "super::trophy_definitions::Column::Id"
    )]
    TrophyDefinitions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::trophy_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrophyDefinitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

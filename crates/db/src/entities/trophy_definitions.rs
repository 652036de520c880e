//! `SeaORM` Entity for the trophy_definitions catalog.
//!
//! Static catalog, read-only at runtime; rows are seeded.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "trophy_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub tier: String,
    pub xp: i32,
    /// Free-text counter key; normalized before evaluation.
    pub rule_key: String,
    /// gte | eq | lte (gte assumed for anything else).
    pub rule_op: String,
    pub rule_value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_trophies::Entity")]
    UserTrophies,
}

impl Related<super::user_trophies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserTrophies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

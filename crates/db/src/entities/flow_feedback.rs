//! `SeaORM` Entity for the flow_feedback table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "flow_feedback")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub analysis_id: Uuid,
    pub correct: Option<bool>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::flow_analyses::Entity",
        from = "Column::AnalysisId",
        to = "super::flow_analyses::Column::Id"
    )]
    FlowAnalyses,
}

impl Related<super::flow_analyses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowAnalyses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

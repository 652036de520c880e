//! `SeaORM` Entity for the flow_analyses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "flow_analyses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub analysis_date: Date,
    pub flow_upload_id: Uuid,
    pub chart_upload_id: Option<Uuid>,
    /// Full analysis response as served to the client.
    pub result: Json,
    pub created_at: DateTimeWithTimeZone,
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
        belongs_to = "super::flow_uploads::Entity",
        from = "Column::FlowUploadId",
        to = "super::flow_uploads::Column::Id"
    )]
    FlowUploads,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::flow_uploads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FlowUploads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Options-flow upload, analysis, and feedback repository.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{flow_analyses, flow_feedback, flow_uploads};

/// Fields for a new upload row.
#[derive(Debug, Clone)]
pub struct CreateUploadInput {
    /// flow | chart.
    pub upload_type: String,
    /// Original filename as submitted.
    pub filename: String,
    /// Object key in the storage backend.
    pub storage_key: String,
    /// MIME type as submitted.
    pub content_type: String,
    /// Flow data provider, if known.
    pub provider: Option<String>,
    /// Underlying symbol, if known.
    pub symbol: Option<String>,
    /// Parsed flow table for flow uploads.
    pub parsed_table: Option<serde_json::Value>,
}

/// Repository for flow uploads and their analyses.
#[derive(Debug, Clone)]
pub struct FlowRepository {
    db: DatabaseConnection,
}

impl FlowRepository {
    /// Creates a new flow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_upload(
        &self,
        user_id: Uuid,
        input: CreateUploadInput,
    ) -> Result<flow_uploads::Model, DbErr> {
        let upload = flow_uploads::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            upload_type: Set(input.upload_type),
            filename: Set(input.filename),
            storage_key: Set(input.storage_key),
            content_type: Set(input.content_type),
            provider: Set(input.provider),
            symbol: Set(input.symbol),
            parsed_table: Set(input.parsed_table),
            created_at: Set(chrono::Utc::now().into()),
        };
        upload.insert(&self.db).await
    }

    /// An upload owned by the user, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_upload(
        &self,
        user_id: Uuid,
        upload_id: Uuid,
    ) -> Result<Option<flow_uploads::Model>, DbErr> {
        flow_uploads::Entity::find_by_id(upload_id)
            .filter(flow_uploads::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Records a completed analysis.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_analysis(
        &self,
        user_id: Uuid,
        symbol: &str,
        analysis_date: NaiveDate,
        flow_upload_id: Uuid,
        chart_upload_id: Option<Uuid>,
        result: serde_json::Value,
    ) -> Result<flow_analyses::Model, DbErr> {
        let analysis = flow_analyses::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            symbol: Set(symbol.to_string()),
            analysis_date: Set(analysis_date),
            flow_upload_id: Set(flow_upload_id),
            chart_upload_id: Set(chart_upload_id),
            result: Set(result),
            created_at: Set(chrono::Utc::now().into()),
        };
        analysis.insert(&self.db).await
    }

    /// An analysis owned by the user, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_analysis(
        &self,
        user_id: Uuid,
        analysis_id: Uuid,
    ) -> Result<Option<flow_analyses::Model>, DbErr> {
        flow_analyses::Entity::find_by_id(analysis_id)
            .filter(flow_analyses::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// A user's analyses, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_analyses(&self, user_id: Uuid) -> Result<Vec<flow_analyses::Model>, DbErr> {
        flow_analyses::Entity::find()
            .filter(flow_analyses::Column::UserId.eq(user_id))
            .order_by_desc(flow_analyses::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Attaches feedback to an analysis.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_feedback(
        &self,
        analysis_id: Uuid,
        correct: Option<bool>,
        notes: Option<String>,
    ) -> Result<flow_feedback::Model, DbErr> {
        let feedback = flow_feedback::ActiveModel {
            id: Set(Uuid::new_v4()),
            analysis_id: Set(analysis_id),
            correct: Set(correct),
            notes: Set(notes),
            created_at: Set(chrono::Utc::now().into()),
        };
        feedback.insert(&self.db).await
    }
}

//! Journal entry routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{AuthUser, MaybeAuth},
};
use tradelog_db::JournalRepository;
use tradelog_db::repositories::journal::JournalEntryInput;

/// Creates the journal list route (answers 401 with an empty list itself).
pub fn list_routes() -> Router<AppState> {
    Router::new().route("/journal", get(list_entries))
}

/// Creates the journal mutation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal", post(upsert_entry))
        .route("/journal/{date}", delete(delete_entry))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JournalEntryRequest {
    entry_date: NaiveDate,
    pnl: Decimal,
    account_id: Option<Uuid>,
    instrument: Option<String>,
    direction: Option<String>,
    entry_price: Option<Decimal>,
    exit_price: Option<Decimal>,
    size: Option<Decimal>,
    #[serde(default)]
    screenshots: Vec<String>,
    notes: Option<String>,
    emotion: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    respected_plan: Option<bool>,
}

fn entry_json(entry: &tradelog_db::entities::journal_entries::Model) -> serde_json::Value {
    json!({
        "id": entry.id,
        "entryDate": entry.entry_date,
        "pnl": entry.pnl,
        "accountId": entry.account_id,
        "instrument": entry.instrument,
        "direction": entry.direction,
        "entryPrice": entry.entry_price,
        "exitPrice": entry.exit_price,
        "size": entry.size,
        "screenshots": entry.screenshots,
        "notes": entry.notes,
        "emotion": entry.emotion,
        "tags": entry.tags,
        "respectedPlan": entry.respected_plan,
        "updatedAt": entry.updated_at
    })
}

/// GET /journal?from&to - Entries in a date range, oldest first.
async fn list_entries(
    State(state): State<AppState>,
    auth: MaybeAuth,
    Query(range): Query<RangeQuery>,
) -> impl IntoResponse {
    let Some(claims) = auth.0 else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "entries": [] })),
        )
            .into_response();
    };

    let journal_repo = JournalRepository::new((*state.db).clone());
    match journal_repo
        .list_range(claims.user_id(), range.from, range.to)
        .await
    {
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({
                "entries": entries.iter().map(entry_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error listing journal entries");
            internal_error()
        }
    }
}

/// POST /journal - Upsert the entry for (user, date).
async fn upsert_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<JournalEntryRequest>,
) -> impl IntoResponse {
    if let Some(direction) = &payload.direction {
        if direction != "long" && direction != "short" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_direction",
                    "message": "Direction must be 'long' or 'short'"
                })),
            )
                .into_response();
        }
    }

    let journal_repo = JournalRepository::new((*state.db).clone());
    let input = JournalEntryInput {
        account_id: payload.account_id,
        entry_date: payload.entry_date,
        pnl: payload.pnl,
        instrument: payload.instrument,
        direction: payload.direction,
        entry_price: payload.entry_price,
        exit_price: payload.exit_price,
        size: payload.size,
        screenshots: json!(payload.screenshots),
        notes: payload.notes,
        emotion: payload.emotion,
        tags: json!(payload.tags),
        respected_plan: payload.respected_plan,
    };

    match journal_repo.upsert(auth.user_id(), input).await {
        Ok(entry) => {
            info!(user_id = %auth.user_id(), date = %entry.entry_date, "Journal entry saved");
            (StatusCode::OK, Json(json!({ "entry": entry_json(&entry) }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to save journal entry");
            internal_error()
        }
    }
}

/// DELETE /journal/{date} - Remove the entry for a day.
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(date): Path<NaiveDate>,
) -> impl IntoResponse {
    let journal_repo = JournalRepository::new((*state.db).clone());

    match journal_repo.delete_by_date(auth.user_id(), date).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "entry_not_found",
                "message": "No journal entry on that date"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete journal entry");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

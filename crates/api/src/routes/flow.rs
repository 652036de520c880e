//! Options-flow ingestion and analysis routes.
//!
//! All routes are entitlement-gated: Advanced/Pro plans or the purchased
//! addon. Uploads land in object storage; the parsed flow table is cached
//! on the upload row. CSV uploads parse inline, screenshots go through the
//! vision client, and analysis falls back to re-reading the stored bytes
//! when no table was cached at ingest time.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use tradelog_core::flow::{self, FlowTable};
use tradelog_core::plan::option_flow_entitled;
use tradelog_core::storage::StorageService;
use tradelog_db::entities::flow_uploads;
use tradelog_db::repositories::flow::CreateUploadInput;
use tradelog_db::{FlowRepository, UserRepository};

/// Creates the flow routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flow/ingest", post(ingest_flow))
        .route("/flow/ingest-chart", post(ingest_chart))
        .route("/flow/analyze", post(analyze))
        .route("/flow/analyses", get(list_analyses))
        .route("/flow/feedback", post(feedback))
        // The route-level size check produces the 413; this only keeps axum
        // from buffering unbounded bodies first.
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    symbol: String,
    date: NaiveDate,
    flow_upload_id: Uuid,
    chart_upload_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackRequest {
    analysis_id: Uuid,
    correct: Option<bool>,
    notes: Option<String>,
}

/// A parsed multipart upload.
struct UploadParts {
    data: Vec<u8>,
    filename: String,
    content_type: String,
    provider: Option<String>,
    symbol: Option<String>,
}

/// Verifies the caller may use options-flow features.
async fn ensure_entitled(state: &AppState, auth: &AuthUser) -> Result<(), Response> {
    let user_repo = UserRepository::new((*state.db).clone());
    let addon = match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(user)) => user.option_flow_addon,
        Ok(None) => false,
        Err(e) => {
            error!(error = %e, "Database error checking entitlement");
            return Err(internal_error());
        }
    };

    if option_flow_entitled(auth.plan(), addon) {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "not_entitled",
                "message": "Options-flow analysis requires the Advanced or Pro plan, or the addon"
            })),
        )
            .into_response())
    }
}

/// The storage service, or a 500 when uploads are not configured.
fn require_storage(state: &AppState) -> Result<&StorageService, Response> {
    state.storage.as_deref().ok_or_else(|| {
        error!("Flow upload received but storage is not configured");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "storage_unavailable",
                "message": "Upload storage is not configured"
            })),
        )
            .into_response()
    })
}

/// Pulls the file and optional metadata fields out of a multipart body.
async fn read_upload(
    multipart: &mut Multipart,
    max_bytes: u64,
) -> Result<UploadParts, Response> {
    let mut data = None;
    let mut filename = String::new();
    let mut content_type = "application/octet-stream".to_string();
    let mut provider = None;
    let mut symbol = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Malformed multipart body");
                return Err(bad_request("invalid_multipart", "Malformed multipart body"));
            }
        };

        match field.name().unwrap_or_default() {
            "file" => {
                filename = field.file_name().unwrap_or("upload").to_string();
                if let Some(ct) = field.content_type() {
                    content_type = ct.to_string();
                }
                let bytes = field.bytes().await.map_err(|e| {
                    warn!(error = %e, "Failed reading upload body");
                    bad_request("invalid_upload", "Could not read the uploaded file")
                })?;
                data = Some(bytes.to_vec());
            }
            "provider" => {
                provider = field.text().await.ok().filter(|s| !s.trim().is_empty());
            }
            "symbol" => {
                symbol = field.text().await.ok().filter(|s| !s.trim().is_empty());
            }
            _ => {}
        }
    }

    let Some(data) = data else {
        return Err(bad_request("missing_file", "A 'file' part is required"));
    };
    if data.is_empty() {
        return Err(bad_request("empty_file", "The uploaded file is empty"));
    }
    if data.len() as u64 > max_bytes {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({
                "error": "upload_too_large",
                "message": format!("Uploads are limited to {max_bytes} bytes")
            })),
        )
            .into_response());
    }

    Ok(UploadParts {
        data,
        filename,
        content_type,
        provider,
        symbol,
    })
}

/// POST /flow/ingest - Upload a flow CSV or screenshot and parse it.
async fn ingest_flow(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Response {
    if let Err(resp) = ensure_entitled(&state, &auth).await {
        return resp;
    }
    let storage = match require_storage(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let parts = match read_upload(&mut multipart, state.max_upload_bytes).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let table = if parts.content_type.starts_with("image/") {
        match state.vision.as_deref() {
            Some(vision) => {
                match vision
                    .extract_flow_table(&parts.data, &parts.content_type)
                    .await
                {
                    Ok(t) => Some(t),
                    Err(e) => {
                        error!(error = %e, "Vision extraction failed");
                        return vision_failed();
                    }
                }
            }
            None => {
                // Stored unparsed; analysis retries once vision is configured
                warn!("Image flow upload received but vision extraction is disabled");
                None
            }
        }
    } else {
        match flow::parse_csv_bytes(&parts.data, parts.provider.as_deref()) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(error = %e, "Flow CSV rejected");
                return bad_request("unparseable_csv", "Could not parse the CSV flow data");
            }
        }
    };

    let upload_id = Uuid::new_v4();
    let provider = table
        .as_ref()
        .and_then(|t| t.provider.clone())
        .or_else(|| parts.provider.clone());
    let key = match storage
        .store_upload(auth.user_id(), upload_id, &parts.filename, parts.data)
        .await
    {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "Failed to store flow upload");
            return internal_error();
        }
    };

    let flow_repo = FlowRepository::new((*state.db).clone());
    let rows = table.as_ref().map_or(0, |t| t.rows.len());
    let parsed_table = table.as_ref().and_then(|t| serde_json::to_value(t).ok());
    let input = CreateUploadInput {
        upload_type: "flow".to_string(),
        filename: parts.filename,
        storage_key: key,
        content_type: parts.content_type,
        provider,
        symbol: parts.symbol,
        parsed_table,
    };

    match flow_repo.create_upload(auth.user_id(), input).await {
        Ok(upload) => {
            info!(upload_id = %upload.id, rows, "Flow CSV ingested");
            (
                StatusCode::OK,
                Json(json!({ "uploadId": upload.id, "rows": rows })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to record flow upload");
            internal_error()
        }
    }
}

/// POST /flow/ingest-chart - Upload a chart image for later analysis context.
async fn ingest_chart(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Response {
    if let Err(resp) = ensure_entitled(&state, &auth).await {
        return resp;
    }
    let storage = match require_storage(&state) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let parts = match read_upload(&mut multipart, state.max_upload_bytes).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let upload_id = Uuid::new_v4();
    let key = match storage
        .store_upload(auth.user_id(), upload_id, &parts.filename, parts.data)
        .await
    {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "Failed to store chart upload");
            return internal_error();
        }
    };

    let flow_repo = FlowRepository::new((*state.db).clone());
    let input = CreateUploadInput {
        upload_type: "chart".to_string(),
        filename: parts.filename,
        storage_key: key,
        content_type: parts.content_type,
        provider: None,
        symbol: parts.symbol,
        parsed_table: None,
    };

    match flow_repo.create_upload(auth.user_id(), input).await {
        Ok(upload) => {
            info!(upload_id = %upload.id, "Chart ingested");
            (StatusCode::OK, Json(json!({ "uploadId": upload.id }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to record chart upload");
            internal_error()
        }
    }
}

/// POST /flow/analyze - Run the analysis pipeline over an ingested upload.
async fn analyze(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AnalyzeRequest>,
) -> Response {
    if let Err(resp) = ensure_entitled(&state, &auth).await {
        return resp;
    }

    let flow_repo = FlowRepository::new((*state.db).clone());

    let upload = match flow_repo
        .find_upload(auth.user_id(), payload.flow_upload_id)
        .await
    {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "upload_not_found",
                    "message": "Flow upload not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error loading flow upload");
            return internal_error();
        }
    };

    let mut table: Option<FlowTable> = upload
        .parsed_table
        .as_ref()
        .and_then(|v| serde_json::from_value(v.clone()).ok());
    if table.as_ref().is_none_or(|t| t.rows.is_empty()) {
        table = reparse_from_storage(&state, &upload).await;
    }

    // A chart upload or an unreadable file cannot drive an analysis.
    let Some(table) = table.filter(|t| !t.rows.is_empty()) else {
        return (
            StatusCode::OK,
            Json(json!({
                "status": "needs_more_data",
                "missing": ["flow_csv"]
            })),
        )
            .into_response();
    };

    let report = flow::analyze_flow(&table);
    let result = json!({
        "symbol": payload.symbol,
        "date": payload.date,
        "engineeredFeatures": report.engineered_features,
        "forecast": report.forecast,
        "keyLevels": report.key_levels,
        "rationale": report.rationale,
        "confidence": report.confidence,
        "disclaimer": flow::DISCLAIMER
    });

    match flow_repo
        .create_analysis(
            auth.user_id(),
            &payload.symbol,
            payload.date,
            payload.flow_upload_id,
            payload.chart_upload_id,
            result.clone(),
        )
        .await
    {
        Ok(analysis) => {
            info!(analysis_id = %analysis.id, symbol = %payload.symbol, "Flow analysis stored");
            let mut body = result;
            body["analysisId"] = json!(analysis.id);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to store flow analysis");
            internal_error()
        }
    }
}

/// GET /flow/analyses - Past analyses for the user, newest first.
async fn list_analyses(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(resp) = ensure_entitled(&state, &auth).await {
        return resp;
    }

    let flow_repo = FlowRepository::new((*state.db).clone());
    match flow_repo.list_analyses(auth.user_id()).await {
        Ok(analyses) => {
            let items: Vec<serde_json::Value> = analyses
                .iter()
                .map(|a| {
                    json!({
                        "id": a.id,
                        "symbol": a.symbol,
                        "date": a.analysis_date,
                        "result": a.result,
                        "createdAt": a.created_at
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "analyses": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error listing analyses");
            internal_error()
        }
    }
}

/// POST /flow/feedback - Attach outcome feedback to an analysis.
async fn feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<FeedbackRequest>,
) -> Response {
    if let Err(resp) = ensure_entitled(&state, &auth).await {
        return resp;
    }

    let flow_repo = FlowRepository::new((*state.db).clone());

    match flow_repo
        .find_analysis(auth.user_id(), payload.analysis_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "analysis_not_found",
                    "message": "Analysis not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error loading analysis");
            return internal_error();
        }
    }

    match flow_repo
        .create_feedback(payload.analysis_id, payload.correct, payload.notes)
        .await
    {
        Ok(_) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to record feedback");
            internal_error()
        }
    }
}

/// Re-reads stored upload bytes when no parsed table was cached, covering
/// uploads ingested before vision extraction was configured.
async fn reparse_from_storage(
    state: &AppState,
    upload: &flow_uploads::Model,
) -> Option<FlowTable> {
    let storage = state.storage.as_deref()?;
    let data = match storage.fetch_upload(&upload.storage_key).await {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, key = %upload.storage_key, "Could not re-read flow upload");
            return None;
        }
    };

    if upload.content_type.starts_with("image/") {
        let vision = state.vision.as_deref()?;
        match vision.extract_flow_table(&data, &upload.content_type).await {
            Ok(table) => Some(table),
            Err(e) => {
                warn!(error = %e, "Vision extraction failed during analysis");
                None
            }
        }
    } else {
        flow::parse_csv_bytes(&data, upload.provider.as_deref()).ok()
    }
}

fn bad_request(error: &str, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

fn vision_failed() -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": "vision_failed",
            "message": "Could not extract a flow table from the image"
        })),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

//! Gamification summary and challenge progress routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::AuthUser};
use tradelog_core::gamification::{ChallengeProgress, ChallengeStatus, GamificationService};
use tradelog_core::streak::longest_streak;
use tradelog_db::repositories::challenge::ProgressUpdate;
use tradelog_db::{ChallengeRepository, JournalRepository};

/// Creates the gamification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gamification/summary", get(summary))
        .route("/gamification/progress", post(record_progress))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRequest {
    challenge_id: String,
    status: String,
    xp_earned: i32,
    #[serde(default)]
    process_green_days: i32,
}

fn to_progress(row: &tradelog_db::entities::challenge_progress::Model) -> ChallengeProgress {
    ChallengeProgress {
        challenge_id: row.challenge_id.clone(),
        status: if row.status == "completed" {
            ChallengeStatus::Completed
        } else {
            ChallengeStatus::Active
        },
        xp_earned: u32::try_from(row.xp_earned.max(0)).unwrap_or(0),
        process_green_days: u32::try_from(row.process_green_days.max(0)).unwrap_or(0),
    }
}

/// GET /gamification/summary - XP, level, tier, badges, and login streak.
async fn summary(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let challenge_repo = ChallengeRepository::new((*state.db).clone());
    let journal_repo = JournalRepository::new((*state.db).clone());

    let records = match challenge_repo.list_for_user(auth.user_id()).await {
        Ok(rows) => rows.iter().map(to_progress).collect::<Vec<_>>(),
        Err(e) => {
            error!(error = %e, "Database error loading challenge progress");
            return internal_error();
        }
    };

    let dates = match journal_repo.entry_dates(auth.user_id()).await {
        Ok(d) => d,
        Err(e) => {
            error!(error = %e, "Database error loading journal dates");
            return internal_error();
        }
    };

    let summary = GamificationService::summarize(&records);
    let login_streak = longest_streak(&dates);

    (
        StatusCode::OK,
        Json(json!({
            "xp": summary.xp,
            "level": summary.level,
            "tier": summary.tier.label(),
            "badges": summary.badges,
            "loginStreak": login_streak
        })),
    )
        .into_response()
}

/// POST /gamification/progress - Record challenge progress for the user.
///
/// Completed rows are frozen; a replayed update returns the stored row
/// unchanged.
async fn record_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ProgressRequest>,
) -> impl IntoResponse {
    if payload.challenge_id.trim().is_empty() {
        return bad_request("invalid_challenge", "Challenge id must not be empty");
    }
    if payload.status != "active" && payload.status != "completed" {
        return bad_request("invalid_status", "Status must be 'active' or 'completed'");
    }
    if payload.xp_earned < 0 || payload.process_green_days < 0 {
        return bad_request("invalid_progress", "Counters must not be negative");
    }

    let challenge_repo = ChallengeRepository::new((*state.db).clone());
    let update = ProgressUpdate {
        status: payload.status,
        xp_earned: payload.xp_earned,
        process_green_days: payload.process_green_days,
    };

    match challenge_repo
        .record_progress(auth.user_id(), &payload.challenge_id, update)
        .await
    {
        Ok(row) => {
            info!(challenge_id = %row.challenge_id, status = %row.status, "Challenge progress recorded");
            (
                StatusCode::OK,
                Json(json!({
                    "challengeId": row.challenge_id,
                    "status": row.status,
                    "xpEarned": row.xp_earned,
                    "processGreenDays": row.process_green_days
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error recording challenge progress");
            internal_error()
        }
    }
}

fn bad_request(error: &str, message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
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

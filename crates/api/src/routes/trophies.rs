//! Trophy catalog and sync routes.

use std::collections::{HashMap, HashSet};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::{
    AppState,
    middleware::{AuthUser, MaybeAuth},
};
use tradelog_core::gamification::{ChallengeStatus, GamificationService};
use tradelog_core::streak::longest_streak;
use tradelog_core::trophy::{RuleOp, TrophyDef, TrophyMatcher};
use tradelog_db::{ChallengeRepository, JournalRepository, TrophyRepository};

/// Creates the trophy list route (answers 401 with an empty list itself).
pub fn list_routes() -> Router<AppState> {
    Router::new().route("/trophies/list", get(list_trophies))
}

/// Creates the trophy sync route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/trophies/sync", post(sync_trophies))
}

fn to_def(row: &tradelog_db::entities::trophy_definitions::Model) -> TrophyDef {
    TrophyDef {
        id: row.id.clone(),
        tier: row.tier.clone(),
        xp: u32::try_from(row.xp.max(0)).unwrap_or(0),
        rule_key: row.rule_key.clone(),
        rule_op: RuleOp::parse_or_default(&row.rule_op),
        rule_value: row.rule_value,
    }
}

/// Counter snapshot the trophy rules evaluate against.
async fn build_counters(
    state: &AppState,
    user_id: uuid::Uuid,
) -> Result<HashMap<String, i64>, sea_orm::DbErr> {
    let journal_repo = JournalRepository::new((*state.db).clone());
    let challenge_repo = ChallengeRepository::new((*state.db).clone());

    let entries = journal_repo.count_entries(user_id).await?;
    let green_days = journal_repo.count_green_days(user_id).await?;
    let plan_days = journal_repo.count_plan_respected(user_id).await?;
    let dates = journal_repo.entry_dates(user_id).await?;
    let records = challenge_repo.list_for_user(user_id).await?;

    let completed = records.iter().filter(|r| r.status == "completed").count();
    let progress: Vec<_> = records
        .iter()
        .map(|r| tradelog_core::gamification::ChallengeProgress {
            challenge_id: r.challenge_id.clone(),
            status: if r.status == "completed" {
                ChallengeStatus::Completed
            } else {
                ChallengeStatus::Active
            },
            xp_earned: u32::try_from(r.xp_earned.max(0)).unwrap_or(0),
            process_green_days: u32::try_from(r.process_green_days.max(0)).unwrap_or(0),
        })
        .collect();

    let mut counters = HashMap::new();
    counters.insert("journal_entries".to_string(), entries as i64);
    counters.insert("green_days".to_string(), green_days as i64);
    counters.insert("plan_respected_days".to_string(), plan_days as i64);
    counters.insert(
        "login_streak".to_string(),
        i64::from(longest_streak(&dates)),
    );
    counters.insert(
        "total_xp".to_string(),
        i64::from(GamificationService::total_xp(&progress)),
    );
    counters.insert("challenges_completed".to_string(), completed as i64);
    Ok(counters)
}

/// GET /trophies/list - Catalog with per-user earned flags.
async fn list_trophies(State(state): State<AppState>, auth: MaybeAuth) -> impl IntoResponse {
    let Some(claims) = auth.0 else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "trophies": [] })),
        )
            .into_response();
    };

    let trophy_repo = TrophyRepository::new((*state.db).clone());

    let catalog = match trophy_repo.catalog().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Database error loading trophy catalog");
            return internal_error();
        }
    };
    let earned: HashSet<String> = match trophy_repo.earned_ids(claims.user_id()).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            error!(error = %e, "Database error loading earned trophies");
            return internal_error();
        }
    };

    let trophies: Vec<_> = catalog
        .iter()
        .map(|def| {
            json!({
                "id": def.id,
                "tier": def.tier,
                "xp": def.xp,
                "earned": earned.contains(&def.id)
            })
        })
        .collect();

    (StatusCode::OK, Json(json!({ "trophies": trophies }))).into_response()
}

/// POST /trophies/sync - Evaluate rules and award newly satisfied trophies.
///
/// Replaying a sync with unchanged counters is a no-op: already-earned
/// trophies are skipped before evaluation and the insert is idempotent.
async fn sync_trophies(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let trophy_repo = TrophyRepository::new((*state.db).clone());

    let catalog: Vec<TrophyDef> = match trophy_repo.catalog().await {
        Ok(rows) => rows.iter().map(to_def).collect(),
        Err(e) => {
            error!(error = %e, "Database error loading trophy catalog");
            return internal_error();
        }
    };
    let earned: HashSet<String> = match trophy_repo.earned_ids(auth.user_id()).await {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            error!(error = %e, "Database error loading earned trophies");
            return internal_error();
        }
    };
    let counters = match build_counters(&state, auth.user_id()).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Database error building trophy counters");
            return internal_error();
        }
    };

    let matched = TrophyMatcher::match_rules(&catalog, &counters, &earned);
    let ids: Vec<&str> = matched.iter().map(|def| def.id.as_str()).collect();

    let inserted = match trophy_repo.award(auth.user_id(), &ids).await {
        Ok(n) => n,
        Err(e) => {
            error!(error = %e, "Failed to award trophies");
            return internal_error();
        }
    };

    if inserted > 0 {
        info!(user_id = %auth.user_id(), inserted, "Trophies awarded");
    }

    (
        StatusCode::OK,
        Json(json!({ "inserted": inserted, "newTrophies": ids })),
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

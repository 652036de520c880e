//! Alert delivery and rule routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{AuthUser, MaybeAuth},
};
use tradelog_db::AlertRepository;
use tradelog_db::repositories::alert::{CreateEventInput, CreateRuleInput};

/// Creates the alert poll route (answers 401 with an empty list itself).
pub fn list_routes() -> Router<AppState> {
    Router::new().route("/alerts/poll", get(poll_alerts))
}

/// Creates the alert mutation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/alerts/events", post(create_event))
        .route("/alerts/{id}/dismiss", post(dismiss_alert))
        .route("/alerts/{id}/snooze", post(snooze_alert))
        .route("/alerts/rules", post(create_rule))
        .route("/alerts/rules", get(list_rules))
        .route("/alerts/rules/{id}/enable", post(set_rule_enabled))
}

#[derive(Debug, Deserialize)]
struct SnoozeRequest {
    minutes: i64,
}

#[derive(Debug, Deserialize)]
struct CreateRuleRequest {
    name: String,
    #[serde(default)]
    condition: serde_json::Value,
    #[serde(default)]
    channels: Vec<String>,
    #[serde(default = "default_severity")]
    severity: String,
}

fn default_severity() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
struct EnableRequest {
    enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventRequest {
    rule_id: Option<Uuid>,
    message: String,
    severity: Option<String>,
    channels: Option<Vec<String>>,
}

fn event_json(event: &tradelog_db::entities::alert_events::Model) -> serde_json::Value {
    json!({
        "id": event.id,
        "message": event.message,
        "severity": event.severity,
        "channels": event.channels,
        "status": event.status,
        "createdAt": event.created_at
    })
}

fn targets_inapp(channels: &serde_json::Value) -> bool {
    channels
        .as_array()
        .is_some_and(|list| list.iter().any(|c| c.as_str() == Some("inapp")))
}

/// GET /alerts/poll - Undelivered events, newest first.
///
/// Snoozed events whose snooze lapsed are re-included. In-app events are
/// marked delivered in bulk server-side; popup and voice events stay
/// undelivered until the client resolves them.
async fn poll_alerts(State(state): State<AppState>, auth: MaybeAuth) -> impl IntoResponse {
    let Some(claims) = auth.0 else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "events": [] })),
        )
            .into_response();
    };
    let user_id = claims.user_id();

    let alert_repo = AlertRepository::new((*state.db).clone());

    let events = match alert_repo.poll_undelivered(user_id, Utc::now()).await {
        Ok(e) => e,
        Err(e) => {
            error!(error = %e, "Database error polling alerts");
            return internal_error();
        }
    };

    let inapp_ids: Vec<Uuid> = events
        .iter()
        .filter(|e| targets_inapp(&e.channels))
        .map(|e| e.id)
        .collect();
    if let Err(e) = alert_repo.mark_delivered(user_id, &inapp_ids).await {
        error!(error = %e, "Failed to mark in-app alerts delivered");
        return internal_error();
    }

    (
        StatusCode::OK,
        Json(json!({
            "events": events.iter().map(event_json).collect::<Vec<_>>()
        })),
    )
        .into_response()
}

/// POST /alerts/events - Record a fired alert event.
///
/// When a rule id is given the rule must be owned and enabled; severity and
/// channels default to the rule's own values.
async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateEventRequest>,
) -> impl IntoResponse {
    if payload.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_message",
                "message": "Event message is required"
            })),
        )
            .into_response();
    }

    let alert_repo = AlertRepository::new((*state.db).clone());

    let rule = match payload.rule_id {
        Some(rule_id) => match alert_repo.find_rule(auth.user_id(), rule_id).await {
            Ok(Some(rule)) if rule.enabled => Some(rule),
            Ok(Some(_)) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "rule_disabled",
                        "message": "Alert rule is disabled"
                    })),
                )
                    .into_response();
            }
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": "rule_not_found",
                        "message": "Alert rule not found"
                    })),
                )
                    .into_response();
            }
            Err(e) => {
                error!(error = %e, "Database error loading alert rule");
                return internal_error();
            }
        },
        None => None,
    };

    let severity = payload
        .severity
        .or_else(|| rule.as_ref().map(|r| r.severity.clone()))
        .unwrap_or_else(|| "info".to_string());
    let channels = payload
        .channels
        .map(|c| json!(c))
        .or_else(|| rule.as_ref().map(|r| r.channels.clone()))
        .unwrap_or_else(|| json!(["inapp"]));

    let input = CreateEventInput {
        rule_id: payload.rule_id,
        message: payload.message.trim().to_string(),
        severity,
        channels,
    };

    match alert_repo.create_event(auth.user_id(), input).await {
        Ok(event) => {
            info!(event_id = %event.id, "Alert event recorded");
            (StatusCode::CREATED, Json(event_json(&event))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to record alert event");
            internal_error()
        }
    }
}

/// POST /alerts/{id}/dismiss - Dismiss an event permanently.
async fn dismiss_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> impl IntoResponse {
    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo.dismiss(auth.user_id(), event_id).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "ok": true }))).into_response(),
        Ok(false) => event_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to dismiss alert");
            internal_error()
        }
    }
}

/// POST /alerts/{id}/snooze - Snooze an event for a number of minutes.
async fn snooze_alert(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<SnoozeRequest>,
) -> impl IntoResponse {
    if payload.minutes <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_snooze",
                "message": "Snooze minutes must be positive"
            })),
        )
            .into_response();
    }

    let alert_repo = AlertRepository::new((*state.db).clone());
    let until = Utc::now() + Duration::minutes(payload.minutes);

    match alert_repo.snooze(auth.user_id(), event_id, until).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "snoozedUntil": until })),
        )
            .into_response(),
        Ok(false) => event_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to snooze alert");
            internal_error()
        }
    }
}

/// POST /alerts/rules - Create an alert rule.
async fn create_rule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateRuleRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Rule name is required"
            })),
        )
            .into_response();
    }

    let alert_repo = AlertRepository::new((*state.db).clone());
    let input = CreateRuleInput {
        name: payload.name.trim().to_string(),
        condition: payload.condition,
        channels: json!(payload.channels),
        severity: payload.severity,
    };

    match alert_repo.create_rule(auth.user_id(), input).await {
        Ok(rule) => {
            info!(rule_id = %rule.id, "Alert rule created");
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": rule.id,
                    "name": rule.name,
                    "severity": rule.severity,
                    "channels": rule.channels,
                    "enabled": rule.enabled
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create alert rule");
            internal_error()
        }
    }
}

/// GET /alerts/rules - The user's alert rules.
async fn list_rules(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo.list_rules(auth.user_id()).await {
        Ok(rules) => {
            let rules: Vec<_> = rules
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "name": r.name,
                        "condition": r.condition,
                        "channels": r.channels,
                        "severity": r.severity,
                        "enabled": r.enabled
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "rules": rules }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error listing alert rules");
            internal_error()
        }
    }
}

/// POST /alerts/rules/{id}/enable - Enable or disable a rule.
async fn set_rule_enabled(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(rule_id): Path<Uuid>,
    Json(payload): Json<EnableRequest>,
) -> impl IntoResponse {
    let alert_repo = AlertRepository::new((*state.db).clone());

    match alert_repo
        .set_rule_enabled(auth.user_id(), rule_id, payload.enabled)
        .await
    {
        Ok(Some(rule)) => (
            StatusCode::OK,
            Json(json!({ "ok": true, "enabled": rule.enabled })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "rule_not_found",
                "message": "Alert rule not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update alert rule");
            internal_error()
        }
    }
}

fn event_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "event_not_found",
            "message": "Alert event not found"
        })),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_inapp() {
        assert!(targets_inapp(&json!(["inapp", "popup"])));
        assert!(!targets_inapp(&json!(["popup", "voice"])));
        assert!(!targets_inapp(&json!({})));
    }
}

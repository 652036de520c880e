//! Trading account routes.

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
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{AuthUser, MaybeAuth},
};
use tradelog_db::repositories::trading_account::{CreateAccountInput, TradingAccountError};
use tradelog_db::{PreferenceRepository, TradingAccountRepository};

/// Creates the account list route (answers 401 with an empty list itself).
pub fn list_routes() -> Router<AppState> {
    Router::new().route("/accounts/list", get(list_accounts))
}

/// Creates the account mutation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/create", post(create_account))
        .route("/accounts/set-active", post(set_active_account))
        .route("/accounts/delete", post(delete_account))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest {
    name: String,
    broker: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountIdRequest {
    account_id: Uuid,
}

fn account_json(account: &tradelog_db::entities::trading_accounts::Model) -> serde_json::Value {
    json!({
        "id": account.id,
        "name": account.name,
        "broker": account.broker,
        "isDefault": account.is_default,
        "createdAt": account.created_at
    })
}

/// GET /accounts/list - Accounts plus the active selection.
async fn list_accounts(State(state): State<AppState>, auth: MaybeAuth) -> impl IntoResponse {
    let Some(claims) = auth.0 else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized",
                "accounts": [],
                "activeAccountId": null
            })),
        )
            .into_response();
    };
    let user_id = claims.user_id();

    let account_repo = TradingAccountRepository::new((*state.db).clone());
    let pref_repo = PreferenceRepository::new((*state.db).clone());

    let accounts = match account_repo.list_for_user(user_id).await {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "Database error listing accounts");
            return internal_error();
        }
    };
    let active = match pref_repo.active_account_id(user_id).await {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "Database error reading active account");
            return internal_error();
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "accounts": accounts.iter().map(account_json).collect::<Vec<_>>(),
            "activeAccountId": active
        })),
    )
        .into_response()
}

/// POST /accounts/create - Create an account within the plan limit.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_name",
                "message": "Account name is required"
            })),
        )
            .into_response();
    }

    let account_repo = TradingAccountRepository::new((*state.db).clone());
    let pref_repo = PreferenceRepository::new((*state.db).clone());
    let max_accounts = auth.plan().max_trading_accounts();

    let input = CreateAccountInput {
        name: payload.name.trim().to_string(),
        broker: payload.broker.trim().to_string(),
    };

    match account_repo
        .create_account(auth.user_id(), input, max_accounts)
        .await
    {
        Ok((account, was_first)) => {
            // The first account automatically becomes the active one.
            if was_first {
                if let Err(e) = pref_repo
                    .set_active_account(auth.user_id(), Some(account.id))
                    .await
                {
                    error!(error = %e, "Failed to set first account active");
                    return internal_error();
                }
            }
            info!(account_id = %account.id, user_id = %auth.user_id(), "Trading account created");
            (
                StatusCode::CREATED,
                Json(json!({ "account": account_json(&account) })),
            )
                .into_response()
        }
        Err(TradingAccountError::PlanLimitReached { limit }) => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "plan_limit_reached",
                "message": format!("Your plan allows at most {limit} trading account(s)")
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create trading account");
            internal_error()
        }
    }
}

/// POST /accounts/set-active - Select the active account.
async fn set_active_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AccountIdRequest>,
) -> impl IntoResponse {
    let account_repo = TradingAccountRepository::new((*state.db).clone());
    let pref_repo = PreferenceRepository::new((*state.db).clone());

    match account_repo
        .find_owned(auth.user_id(), payload.account_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "account_not_found",
                    "message": "Trading account not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error finding account");
            return internal_error();
        }
    }

    if let Err(e) = pref_repo
        .set_active_account(auth.user_id(), Some(payload.account_id))
        .await
    {
        error!(error = %e, "Failed to set active account");
        return internal_error();
    }

    (
        StatusCode::OK,
        Json(json!({ "ok": true, "activeAccountId": payload.account_id })),
    )
        .into_response()
}

/// POST /accounts/delete - Delete an account, guarded by business rules.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AccountIdRequest>,
) -> impl IntoResponse {
    let account_repo = TradingAccountRepository::new((*state.db).clone());
    let pref_repo = PreferenceRepository::new((*state.db).clone());

    let active = match pref_repo.active_account_id(auth.user_id()).await {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, "Database error reading active account");
            return internal_error();
        }
    };

    match account_repo
        .delete_account(auth.user_id(), payload.account_id, active)
        .await
    {
        Ok(()) => {
            info!(account_id = %payload.account_id, "Trading account deleted");
            (StatusCode::OK, Json(json!({ "ok": true }))).into_response()
        }
        Err(TradingAccountError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "account_not_found",
                "message": "Trading account not found"
            })),
        )
            .into_response(),
        Err(TradingAccountError::LastAccount) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "last_account",
                "message": "Cannot delete the last remaining trading account"
            })),
        )
            .into_response(),
        Err(TradingAccountError::ActiveAccount) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "active_account",
                "message": "Switch the active account before deleting this one"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete trading account");
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

//! Checkout routes backed by the billing provider.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::billing::{BillingError, CheckoutParams};
use crate::{AppState, middleware::AuthUser};
use tradelog_db::UserRepository;

/// Creates the billing routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/checkout/create-session", post(create_session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    plan_id: String,
    billing_cycle: String,
    coupon_code: Option<String>,
    #[serde(default)]
    addon_option_flow: bool,
}

/// POST /checkout/create-session - Hosted checkout URL for a plan upgrade.
async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let plan_id = payload.plan_id.trim().to_ascii_lowercase();
    if plan_id != "advanced" && plan_id != "pro" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_plan",
                "message": "Plan must be 'advanced' or 'pro'"
            })),
        )
            .into_response();
    }
    let cycle = payload.billing_cycle.trim().to_ascii_lowercase();
    if cycle != "monthly" && cycle != "yearly" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_billing_cycle",
                "message": "Billing cycle must be 'monthly' or 'yearly'"
            })),
        )
            .into_response();
    }

    // Sessions are keyed to the provider customer for the user's email.
    let user_repo = UserRepository::new((*state.db).clone());
    let user = match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "user_not_found",
                    "message": "User no longer exists"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error loading user for checkout");
            return internal_error();
        }
    };

    let params = CheckoutParams {
        email: user.email,
        plan_id,
        billing_cycle: cycle,
        coupon_code: payload.coupon_code,
        addon_option_flow: payload.addon_option_flow,
    };

    match state.billing.create_checkout_session(&params).await {
        Ok(url) => {
            info!(user_id = %auth.user_id(), plan = %params.plan_id, "Checkout session created");
            (StatusCode::OK, Json(json!({ "url": url }))).into_response()
        }
        Err(BillingError::InvalidCoupon(code)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_coupon",
                "message": format!("Coupon '{code}' is not valid")
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Billing provider error creating checkout session");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "billing_unavailable",
                    "message": "Could not create a checkout session, try again later"
                })),
            )
                .into_response()
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

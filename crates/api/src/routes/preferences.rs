//! User preference routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use tradelog_db::PreferenceRepository;
use tradelog_db::repositories::preference::PreferencePatch;

/// Creates the preference routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/preferences", get(get_preferences))
        .route("/preferences", post(update_preferences))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferenceRequest {
    theme: Option<String>,
    locale: Option<String>,
    /// Present-and-null clears the active account; absent leaves it alone.
    #[serde(default, with = "double_option")]
    active_account_id: Option<Option<Uuid>>,
}

/// Distinguishes an absent field from an explicit null.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

fn preference_json(prefs: &tradelog_db::entities::preferences::Model) -> serde_json::Value {
    json!({
        "theme": prefs.theme,
        "locale": prefs.locale,
        "activeAccountId": prefs.active_account_id,
        "updatedAt": prefs.updated_at
    })
}

/// GET /preferences - Current preferences, defaults when never written.
async fn get_preferences(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let pref_repo = PreferenceRepository::new((*state.db).clone());

    match pref_repo.get(auth.user_id()).await {
        Ok(Some(prefs)) => (StatusCode::OK, Json(preference_json(&prefs))).into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(json!({
                "theme": "dark",
                "locale": "en",
                "activeAccountId": null,
                "updatedAt": null
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error loading preferences");
            internal_error()
        }
    }
}

/// POST /preferences - Partial upsert keyed by user id.
async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PreferenceRequest>,
) -> impl IntoResponse {
    if let Some(theme) = &payload.theme {
        if theme != "dark" && theme != "light" {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_theme",
                    "message": "Theme must be 'dark' or 'light'"
                })),
            )
                .into_response();
        }
    }

    let pref_repo = PreferenceRepository::new((*state.db).clone());
    let patch = PreferencePatch {
        theme: payload.theme,
        locale: payload.locale,
        active_account_id: payload.active_account_id,
    };

    match pref_repo.upsert(auth.user_id(), patch).await {
        Ok(prefs) => (StatusCode::OK, Json(preference_json(&prefs))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update preferences");
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

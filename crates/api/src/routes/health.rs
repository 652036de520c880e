//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether upload storage is available for flow ingestion.
    pub storage: bool,
    /// Whether screenshot extraction is available.
    pub vision: bool,
}

/// Health check handler, reporting which optional subsystems are up.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage.is_some(),
        vision: state.vision.is_some(),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_shape() {
        let body = serde_json::to_value(HealthResponse {
            status: "healthy",
            version: "0.1.0",
            storage: true,
            vision: false,
        })
        .expect("serializable");
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], true);
        assert_eq!(body["vision"], false);
    }
}

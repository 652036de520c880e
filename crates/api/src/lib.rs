//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Billing provider client
//! - Vision-model client for screenshot extraction

pub mod billing;
pub mod middleware;
pub mod routes;
pub mod vision;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tradelog_core::storage::StorageService;
use tradelog_shared::JwtService;

use crate::billing::BillingClient;
use crate::vision::VisionClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Storage service for flow uploads (optional).
    pub storage: Option<Arc<StorageService>>,
    /// Billing provider client.
    pub billing: Arc<BillingClient>,
    /// Vision client for screenshot extraction (optional).
    pub vision: Option<Arc<VisionClient>>,
    /// Upload size cap in bytes, enforced at the flow routes.
    pub max_upload_bytes: u64,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod accounts;
pub mod alerts;
pub mod auth;
pub mod billing;
pub mod flow;
pub mod gamification;
pub mod health;
pub mod journal;
pub mod preferences;
pub mod trophies;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(accounts::routes())
        .merge(preferences::routes())
        .merge(journal::routes())
        .merge(gamification::routes())
        .merge(trophies::routes())
        .merge(alerts::routes())
        .merge(billing::routes())
        .merge(flow::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // List routes answer 401 themselves with shaped empty payloads, so they
    // sit outside the middleware and validate the token via MaybeAuth.
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(accounts::list_routes())
        .merge(journal::list_routes())
        .merge(trophies::list_routes())
        .merge(alerts::list_routes())
        .merge(protected_routes)
}

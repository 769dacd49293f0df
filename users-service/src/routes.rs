//! Router assembly

use axum::{routing::get, Router};

use crate::{
    handlers::{create_user, delete_user, get_user, list_users, update_user},
    health::{health, readiness},
    openapi,
    state::AppState,
};

/// The `/users` resource
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Full application router: users, probes, and (if enabled) API docs
///
/// Middleware is not applied here; see [`crate::server::Server::apply_middleware`].
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .merge(user_routes())
        .route("/health", get(health))
        .route("/ready", get(readiness));

    if state.config().docs.enabled {
        app = app.merge(openapi::docs_router(state.config()));
    }

    app.with_state(state)
}

//! HTTP application assembly
//!
//! Wires the auth API and the page routes behind the session guard. The page
//! handlers are placeholders: rendering the dashboard is not this crate's job.

use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::core::auth::{
    AuthApiState, AuthService, CurrentSession, PasswordVerifier, auth_api_router, session_guard,
};
use crate::core::db::UserStore;

/// Build the application router
pub fn app<S, P>(auth_service: AuthService<S, P>) -> Router
where
    S: UserStore,
    P: PasswordVerifier,
{
    let state = Arc::new(AuthApiState::new(auth_service));

    Router::new()
        .route("/", get(home_page))
        .route("/login", get(login_page))
        .route("/dashboard", get(dashboard_page))
        .route("/dashboard/{*rest}", get(dashboard_page))
        .merge(auth_api_router(state.clone()))
        .layer(middleware::from_fn_with_state(state, session_guard::<S, P>))
        .layer(TraceLayer::new_for_http())
}

async fn home_page() -> &'static str {
    "Dashboard"
}

async fn login_page() -> &'static str {
    "Log in"
}

async fn dashboard_page(CurrentSession(session): CurrentSession) -> String {
    let name = session
        .and_then(|s| s.user.name)
        .unwrap_or_else(|| "there".to_string());
    format!("Welcome, {name}")
}

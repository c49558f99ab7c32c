//! Auth API endpoints
//!
//! Provides REST API endpoints for authentication:
//! - POST /api/auth/login - Verify credentials and set the session cookie
//! - POST /api/auth/logout - Clear the session cookie
//! - GET /api/auth/session - Current session or `null`
//! - POST /api/auth/session - Refresh session claims from the user store

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use std::sync::Arc;

use crate::core::auth::cookie::{clear_session_cookie, session_cookie};
use crate::core::auth::credentials::CredentialsInput;
use crate::core::auth::error::AuthError;
use crate::core::auth::middleware::{CurrentSession, CurrentToken};
use crate::core::auth::password::{BcryptVerifier, PasswordVerifier};
use crate::core::auth::service::{AuthService, SignedIn};
use crate::core::auth::session::Session;
use crate::core::db::UserStore;

/// Auth API state containing the auth service
#[derive(Clone)]
pub struct AuthApiState<S, P = BcryptVerifier> {
    pub auth_service: AuthService<S, P>,
}

impl<S, P> AuthApiState<S, P> {
    pub fn new(auth_service: AuthService<S, P>) -> Self {
        Self { auth_service }
    }
}

/// Response for logout
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Create the auth API router
pub fn auth_api_router<S, P>(state: Arc<AuthApiState<S, P>>) -> Router
where
    S: UserStore,
    P: PasswordVerifier,
{
    Router::new()
        .route("/api/auth/login", post(login_handler::<S, P>))
        .route("/api/auth/logout", post(logout_handler::<S, P>))
        .route(
            "/api/auth/session",
            axum::routing::get(session_handler).post(update_handler::<S, P>),
        )
        .with_state(state)
}

/// POST /api/auth/login
/// Verify credentials and start a session
async fn login_handler<S, P>(
    State(state): State<Arc<AuthApiState<S, P>>>,
    payload: Result<Json<CredentialsInput>, JsonRejection>,
) -> Result<Response, AuthError>
where
    S: UserStore,
    P: PasswordVerifier,
{
    // A body that is not even JSON is just another malformed credential
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            tracing::debug!("Malformed login body: {}", rejection.body_text());
            return Err(AuthError::InvalidCredentials);
        }
    };

    let signed_in = state.auth_service.sign_in(&input).await?;

    session_response(&state, signed_in)
}

/// POST /api/auth/logout
/// End the session by clearing the cookie
async fn logout_handler<S, P>(
    State(state): State<Arc<AuthApiState<S, P>>>,
    CurrentToken(token): CurrentToken,
) -> Response
where
    S: UserStore,
    P: PasswordVerifier,
{
    state.auth_service.sign_out(token.as_ref());

    let secure = state.auth_service.tokens().config().secure_cookie;
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(secure) {
        headers.insert(SET_COOKIE, cookie);
    }

    (
        StatusCode::OK,
        headers,
        Json(LogoutResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
        .into_response()
}

/// GET /api/auth/session
/// Current session, or `null` when signed out
async fn session_handler(CurrentSession(session): CurrentSession) -> Json<Option<Session>> {
    Json(session)
}

/// POST /api/auth/session
/// Update trigger: pull role and name from the user store into the session
async fn update_handler<S, P>(
    State(state): State<Arc<AuthApiState<S, P>>>,
    CurrentToken(token): CurrentToken,
) -> Result<Response, AuthError>
where
    S: UserStore,
    P: PasswordVerifier,
{
    let token = token.ok_or(AuthError::Unauthenticated)?;

    match state.auth_service.update(token).await {
        Ok(updated) => session_response(&state, updated),
        Err(AuthError::SessionRevoked) => {
            let secure = state.auth_service.tokens().config().secure_cookie;
            let mut response = AuthError::SessionRevoked.into_response();
            if let Ok(cookie) = clear_session_cookie(secure) {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            Ok(response)
        }
        Err(e) => Err(e),
    }
}

/// Session JSON plus a `Set-Cookie` carrying the token
fn session_response<S, P>(
    state: &AuthApiState<S, P>,
    signed_in: SignedIn,
) -> Result<Response, AuthError>
where
    S: UserStore,
    P: PasswordVerifier,
{
    let secure = state.auth_service.tokens().config().secure_cookie;
    let cookie = session_cookie(&signed_in.token, secure)
        .map_err(|e| AuthError::InternalError(e.to_string()))?;

    Ok(([(SET_COOKIE, cookie)], Json(signed_in.session)).into_response())
}

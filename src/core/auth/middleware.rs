//! Per-request session handling
//!
//! `session_guard` runs before every route handler: it resolves the session
//! cookie, re-issues the cookie when the token was re-signed, applies the
//! route guard and exposes the session to handlers through request
//! extensions.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::core::auth::api::AuthApiState;
use crate::core::auth::cookie::{
    SESSION_COOKIE, clear_session_cookie, session_cookie, sets_session_cookie,
};
use crate::core::auth::guard::AuthorizationDecision;
use crate::core::auth::jwt::SessionToken;
use crate::core::auth::password::PasswordVerifier;
use crate::core::auth::session::Session;
use crate::core::db::UserStore;

/// Session guard middleware
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn session_guard<S, P>(
    State(state): State<Arc<AuthApiState<S, P>>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response
where
    S: UserStore,
    P: PasswordVerifier,
{
    let service = &state.auth_service;
    let secure = service.tokens().config().secure_cookie;

    let presented = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());
    let resolved = presented.as_deref().and_then(|raw| service.resolve(raw));

    let cookie_update = match &resolved {
        Some(resolved) if resolved.reissued => session_cookie(&resolved.token, secure).ok(),
        // Stale or forged cookie: drop it
        None if presented.is_some() => clear_session_cookie(secure).ok(),
        _ => None,
    };

    let path = request.uri().path().to_owned();
    let decision = service.authorize(&path, resolved.as_ref().map(|r| &r.session));

    let mut response = match decision {
        AuthorizationDecision::RedirectTo(target) => {
            tracing::debug!("Redirecting {} to {}", path, target);
            Redirect::to(&target).into_response()
        }
        AuthorizationDecision::Allow => {
            if let Some(resolved) = resolved {
                request.extensions_mut().insert(resolved.session);
                request.extensions_mut().insert(resolved.token);
            }
            next.run(request).await
        }
    };

    // Handlers that set the cookie themselves (login, logout, update) win
    if let Some(cookie) = cookie_update
        && !sets_session_cookie(response.headers())
    {
        response.headers_mut().append(SET_COOKIE, cookie);
    }

    response
}

// ============================================================================
// Session Extractors
// ============================================================================

/// Materialized session of the current request, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(parts.extensions.get::<Session>().cloned()))
    }
}

/// Validated session token of the current request, if any. Never rejects.
#[derive(Debug, Clone)]
pub struct CurrentToken(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for CurrentToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentToken(parts.extensions.get::<SessionToken>().cloned()))
    }
}

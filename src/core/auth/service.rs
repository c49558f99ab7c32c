//! Authentication service
//!
//! Runs the auth pipeline in order: verify credentials, issue or refresh the
//! session token, materialize the session, authorize the route. Holds the
//! user store handle explicitly; there is no global state.

use crate::core::auth::credentials::{self, CredentialsInput};
use crate::core::auth::error::AuthError;
use crate::core::auth::guard::{AuthorizationDecision, RouteGuard};
use crate::core::auth::jwt::{SessionToken, SessionTokenManager};
use crate::core::auth::password::{BcryptVerifier, PasswordVerifier};
use crate::core::auth::session::Session;
use crate::core::db::UserStore;

/// Result of a successful sign-in or update
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: SessionToken,
    pub session: Session,
}

/// Session recovered from an incoming request
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub token: SessionToken,
    pub session: Session,
    /// True when the token was re-signed and the cookie must be replaced
    pub reissued: bool,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S, P = BcryptVerifier> {
    store: S,
    passwords: P,
    tokens: SessionTokenManager,
    guard: RouteGuard,
}

impl<S: UserStore> AuthService<S> {
    /// Create an authentication service using bcrypt for password checks
    pub fn new(store: S, tokens: SessionTokenManager) -> Self {
        Self::with_verifier(store, BcryptVerifier, tokens)
    }
}

impl<S, P> AuthService<S, P>
where
    S: UserStore,
    P: PasswordVerifier,
{
    pub fn with_verifier(store: S, passwords: P, tokens: SessionTokenManager) -> Self {
        Self {
            store,
            passwords,
            tokens,
            guard: RouteGuard::default(),
        }
    }

    /// Replace the default `/login` + `/dashboard` route guard
    pub fn with_guard(mut self, guard: RouteGuard) -> Self {
        self.guard = guard;
        self
    }

    pub fn tokens(&self) -> &SessionTokenManager {
        &self.tokens
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Verify credentials and issue a new session
    pub async fn sign_in(&self, input: &CredentialsInput) -> Result<SignedIn, AuthError> {
        let user = credentials::verify(&self.store, &self.passwords, input).await?;

        let token = self.tokens.issue(&user)?;
        let session = Session::from_token(&token);

        tracing::info!("User {} signed in", user.email);

        Ok(SignedIn { token, session })
    }

    /// Record a sign-out. Tokens are stateless, so ending the session is the
    /// caller clearing the cookie.
    pub fn sign_out(&self, token: Option<&SessionToken>) {
        match token {
            Some(token) => tracing::info!("User {} signed out", token.claims().email),
            None => tracing::info!("User signed out"),
        }
    }

    /// Decode a cookie value, refresh it if it is due, and build the session.
    ///
    /// Any signature or expiry failure means "no session".
    pub fn resolve(&self, raw_token: &str) -> Option<ResolvedSession> {
        let token = match self.tokens.decode(raw_token) {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                return None;
            }
        };

        let (token, reissued) = match self.tokens.refresh_on_access(token.clone()) {
            Ok(refreshed) => {
                let reissued = refreshed.as_str() != token.as_str();
                if reissued {
                    tracing::debug!("Re-signed session token for {}", token.claims().email);
                }
                (refreshed, reissued)
            }
            Err(e) => {
                tracing::error!("Failed to re-sign session token: {}", e);
                (token, false)
            }
        };

        let session = Session::from_token(&token);

        Some(ResolvedSession {
            token,
            session,
            reissued,
        })
    }

    /// Explicit update trigger: refresh role and name from the user store
    pub async fn update(&self, token: SessionToken) -> Result<SignedIn, AuthError> {
        let token = self
            .tokens
            .refresh_on_update_trigger(&self.store, token)
            .await?;
        let session = Session::from_token(&token);

        Ok(SignedIn { token, session })
    }

    /// Route decision for a request path
    pub fn authorize(&self, path: &str, session: Option<&Session>) -> AuthorizationDecision {
        self.guard.authorize(path, session.is_some())
    }
}

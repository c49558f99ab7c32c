//! Authentication module for the dashboard
//!
//! This module provides authentication functionality including:
//! - Credential verification against the user store
//! - Session token issuance, decoding and refresh
//! - Session materialization and route authorization
//! - REST API endpoints and the per-request session guard

pub mod api;
pub mod cookie;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
pub mod session;

pub use api::{AuthApiState, auth_api_router};
pub use cookie::SESSION_COOKIE;
pub use credentials::{Credentials, CredentialsError, CredentialsInput, verify};
pub use error::AuthError;
pub use guard::{AuthorizationDecision, RouteGuard};
pub use jwt::{
    RefreshFailurePolicy, SessionClaims, SessionConfig, SessionToken, SessionTokenManager,
    TokenError,
};
pub use middleware::{CurrentSession, CurrentToken, session_guard};
pub use password::{BcryptVerifier, PasswordVerifier};
pub use service::{AuthService, ResolvedSession, SignedIn};
pub use session::{Session, SessionUser, materialize};

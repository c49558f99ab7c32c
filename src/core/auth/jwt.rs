//! Session token issuance, decoding and refresh
//!
//! Session tokens are HS256 JWTs stored in the session cookie. A token lives
//! at most `max_age` (30 days) from sign-in; it is re-signed on access once it
//! is older than `update_age` (24 hours) and on explicit update triggers, but
//! its expiry never moves past the original sign-in time plus `max_age`.

use std::str::FromStr;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::auth::error::AuthError;
use crate::core::db::{User, UserStore};

/// Absolute session lifetime (30 days)
pub const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

/// Age after which a token is re-signed on access (24 hours)
pub const SESSION_UPDATE_AGE_SECS: i64 = 24 * 60 * 60;

const DEFAULT_ISSUER: &str = "dashboard";

/// What to do when an update-trigger refresh cannot reach the user record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshFailurePolicy {
    /// Keep the session with its previous claims
    #[default]
    KeepSession,
    /// End the session; the caller clears the cookie
    EndSession,
}

impl FromStr for RefreshFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::KeepSession),
            "end" => Ok(Self::EndSession),
            other => Err(format!("unknown refresh failure policy: {other}")),
        }
    }
}

impl std::fmt::Display for RefreshFailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshFailurePolicy::KeepSession => write!(f, "keep"),
            RefreshFailurePolicy::EndSession => write!(f, "end"),
        }
    }
}

/// Session token configuration
#[derive(Clone)]
pub struct SessionConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Absolute token lifetime in seconds
    pub max_age_secs: i64,
    /// Re-sign threshold in seconds
    pub update_age_secs: i64,
    /// Token issuer
    pub issuer: String,
    pub refresh_failure_policy: RefreshFailurePolicy,
    /// Mark the session cookie `Secure`
    pub secure_cookie: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("max_age_secs", &self.max_age_secs)
            .field("update_age_secs", &self.update_age_secs)
            .field("issuer", &self.issuer)
            .field("refresh_failure_policy", &self.refresh_failure_policy)
            .field("secure_cookie", &self.secure_cookie)
            .finish()
    }
}

impl SessionConfig {
    /// Create a new session configuration with default lifetimes
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            max_age_secs: SESSION_MAX_AGE_SECS,
            update_age_secs: SESSION_UPDATE_AGE_SECS,
            issuer: DEFAULT_ISSUER.to_string(),
            refresh_failure_policy: RefreshFailurePolicy::default(),
            secure_cookie: false,
        }
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self, TokenError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self, TokenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = var("AUTH_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingSecret)?;

        let max_age = parse_secs(&var, "AUTH_SESSION_MAX_AGE_SECS", SESSION_MAX_AGE_SECS)?;
        let update_age =
            parse_secs(&var, "AUTH_SESSION_UPDATE_AGE_SECS", SESSION_UPDATE_AGE_SECS)?;

        let issuer = var("AUTH_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string());

        let policy = match var("AUTH_REFRESH_FAILURE_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to keep", e);
                RefreshFailurePolicy::default()
            }),
            None => RefreshFailurePolicy::default(),
        };

        let secure_cookie = var("AUTH_COOKIE_SECURE")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(false);

        let config = Self {
            secret,
            max_age_secs: max_age,
            update_age_secs: update_age,
            issuer,
            refresh_failure_policy: policy,
            secure_cookie,
        };
        config.validate()?;

        Ok(config)
    }

    /// Check that both lifetimes are positive, that `update_age` does not
    /// exceed `max_age`, and that a token issued now can carry its expiry.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.max_age_secs <= 0 {
            return Err(TokenError::InvalidSessionConfig(format!(
                "session max age must be positive, got {}",
                self.max_age_secs
            )));
        }
        if self.update_age_secs <= 0 {
            return Err(TokenError::InvalidSessionConfig(format!(
                "session update age must be positive, got {}",
                self.update_age_secs
            )));
        }
        if self.update_age_secs > self.max_age_secs {
            return Err(TokenError::InvalidSessionConfig(format!(
                "session update age {} exceeds max age {}",
                self.update_age_secs, self.max_age_secs
            )));
        }
        if expiry_after(Utc::now(), self.max_age_secs).is_none() {
            return Err(TokenError::InvalidSessionConfig(format!(
                "session max age {} is out of range",
                self.max_age_secs
            )));
        }

        Ok(())
    }

    /// Set absolute token lifetime
    pub fn max_age(mut self, secs: i64) -> Self {
        self.max_age_secs = secs;
        self
    }

    /// Set re-sign threshold
    pub fn update_age(mut self, secs: i64) -> Self {
        self.update_age_secs = secs;
        self
    }

    /// Set issuer
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn refresh_failure_policy(mut self, policy: RefreshFailurePolicy) -> Self {
        self.refresh_failure_policy = policy;
        self
    }

    pub fn secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }
}

fn parse_secs<F>(var: &F, name: &str, default: i64) -> Result<i64, TokenError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            TokenError::InvalidSessionConfig(format!("{name} is not a whole number of seconds: {raw}"))
        }),
        None => Ok(default),
    }
}

/// `now + secs`, or `None` when it falls outside the representable range
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|ttl| now.checked_add_signed(ttl))
}

/// Token errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("AUTH_SECRET environment variable not set")]
    MissingSecret,

    #[error("Invalid session configuration: {0}")]
    InvalidSessionConfig(String),

    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Token decoding failed: {0}")]
    DecodingError(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer => TokenError::InvalidToken,
            _ => TokenError::DecodingError(err.to_string()),
        }
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Original sign-in time (Unix timestamp)
    pub auth_time: i64,
    /// Last (re-)signing time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// JWT ID, fixed for the lifetime of the session
    pub jti: String,
}

/// A decoded, signature-checked session token together with its compact form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    claims: SessionClaims,
    encoded: String,
}

impl SessionToken {
    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    /// Compact JWS representation, suitable for a cookie value
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.claims.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Seconds until expiry, never negative
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.claims.exp - now.timestamp()).max(0)
    }
}

/// Issues, decodes and refreshes session tokens
#[derive(Clone)]
pub struct SessionTokenManager {
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionTokenManager {
    /// Create a new token manager
    pub fn new(config: SessionConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Issue a token for a freshly verified user
    pub fn issue(&self, user: &User) -> Result<SessionToken, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<SessionToken, TokenError> {
        let exp = expiry_after(now, self.config.max_age_secs).ok_or_else(|| {
            TokenError::EncodingError(format!(
                "session max age {} is out of range",
                self.config.max_age_secs
            ))
        })?;

        let claims = SessionClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: Some(user.name.clone()),
            role: Some(user.role.clone()),
            auth_time: now.timestamp(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        self.sign(claims)
    }

    /// Validate signature, issuer and expiry of a compact token
    pub fn decode(&self, token: &str) -> Result<SessionToken, TokenError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        // Set leeway to 0 for strict expiration checking
        validation.leeway = 0;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)?;

        Ok(SessionToken {
            claims: token_data.claims,
            encoded: token.to_string(),
        })
    }

    /// Whether a token is old enough to be re-signed and still unexpired
    pub fn needs_refresh_at(&self, token: &SessionToken, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        now - token.claims.iat >= self.config.update_age_secs && now < token.claims.exp
    }

    /// Re-sign a token that is older than `update_age`; otherwise return it unchanged
    pub fn refresh_on_access(&self, token: SessionToken) -> Result<SessionToken, TokenError> {
        self.refresh_on_access_at(token, Utc::now())
    }

    pub fn refresh_on_access_at(
        &self,
        token: SessionToken,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, TokenError> {
        if !self.needs_refresh_at(&token, now) {
            return Ok(token);
        }

        let mut claims = token.claims;
        claims.iat = now.timestamp();

        self.sign(claims)
    }

    /// Pull current `role` and `name` from the user store into the token.
    ///
    /// When the user is gone or the store cannot be reached the outcome is
    /// decided by the configured `RefreshFailurePolicy`.
    pub async fn refresh_on_update_trigger<S: UserStore>(
        &self,
        store: &S,
        token: SessionToken,
    ) -> Result<SessionToken, AuthError> {
        self.refresh_on_update_trigger_at(store, token, Utc::now())
            .await
    }

    pub async fn refresh_on_update_trigger_at<S: UserStore>(
        &self,
        store: &S,
        token: SessionToken,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, AuthError> {
        let user = match store.find_user_by_email(&token.claims.email).await {
            Ok(Some(user)) => user,
            Ok(None) => return self.on_refresh_failure(token, "user no longer exists"),
            Err(e) => return self.on_refresh_failure(token, &e.to_string()),
        };

        let mut claims = token.claims.clone();
        claims.role = Some(user.role);
        claims.name = Some(user.name);
        claims.iat = now.timestamp();

        match self.sign(claims) {
            Ok(refreshed) => Ok(refreshed),
            Err(e) => self.on_refresh_failure(token, &e.to_string()),
        }
    }

    fn on_refresh_failure(
        &self,
        token: SessionToken,
        reason: &str,
    ) -> Result<SessionToken, AuthError> {
        match self.config.refresh_failure_policy {
            RefreshFailurePolicy::KeepSession => {
                tracing::warn!(
                    "Session refresh failed for {}, keeping previous claims: {}",
                    token.claims.email,
                    reason
                );
                Ok(token)
            }
            RefreshFailurePolicy::EndSession => {
                tracing::warn!(
                    "Session refresh failed for {}, ending session: {}",
                    token.claims.email,
                    reason
                );
                Err(AuthError::SessionRevoked)
            }
        }
    }

    fn sign(&self, claims: SessionClaims) -> Result<SessionToken, TokenError> {
        let encoded = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingError(e.to_string()))?;

        Ok(SessionToken { claims, encoded })
    }
}

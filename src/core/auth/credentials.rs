//! Credential verification
//!
//! Turns raw login input into a user record: shape validation first, then a
//! single store lookup, then a bcrypt comparison. Any failure on the way is
//! reported as the same `AuthError::InvalidCredentials`.

use serde::Deserialize;

use crate::core::auth::error::AuthError;
use crate::core::auth::password::PasswordVerifier;
use crate::core::db::{User, UserStore};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Raw login input as submitted by the client. Fields may be missing.
#[derive(Clone, Default, Deserialize)]
pub struct CredentialsInput {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }
}

impl std::fmt::Debug for CredentialsInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsInput")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Reason a credentials input was rejected before any lookup.
///
/// Only ever logged; callers see `AuthError::InvalidCredentials`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    #[error("email is missing")]
    MissingEmail,

    #[error("password is missing")]
    MissingPassword,

    #[error("email is not a valid address")]
    InvalidEmail,

    #[error("password is too short")]
    PasswordTooShort,
}

/// Well-formed credentials
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Validate the shape of raw input
    pub fn parse(input: &CredentialsInput) -> Result<Self, CredentialsError> {
        let email = input.email.as_deref().ok_or(CredentialsError::MissingEmail)?;
        let password = input
            .password
            .as_deref()
            .ok_or(CredentialsError::MissingPassword)?;

        validate_email(email)?;

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CredentialsError::PasswordTooShort);
        }

        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Validate email format: `local@domain.tld`, no whitespace
fn validate_email(email: &str) -> Result<(), CredentialsError> {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(CredentialsError::InvalidEmail);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(CredentialsError::InvalidEmail);
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(CredentialsError::InvalidEmail);
    }

    // Domain needs at least one dot and no empty labels
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(CredentialsError::InvalidEmail);
    }

    Ok(())
}

/// Authenticate raw login input against the user store.
///
/// Malformed input is rejected without touching the store. Unknown users,
/// wrong passwords and store failures all come back as `InvalidCredentials`.
pub async fn verify<S, P>(
    store: &S,
    passwords: &P,
    input: &CredentialsInput,
) -> Result<User, AuthError>
where
    S: UserStore,
    P: PasswordVerifier,
{
    let credentials = Credentials::parse(input).map_err(|reason| {
        tracing::debug!("Rejected credentials before lookup: {}", reason);
        AuthError::InvalidCredentials
    })?;

    let user = match store.find_user_by_email(credentials.email()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!("No user for email {}", credentials.email());
            check_password(passwords, &credentials.password, None).await;
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => {
            tracing::error!("Failed to fetch user: {}", e);
            check_password(passwords, &credentials.password, None).await;
            return Err(AuthError::InvalidCredentials);
        }
    };

    let stored_hash = user.password_hash.as_str();
    if check_password(passwords, &credentials.password, Some(stored_hash)).await {
        Ok(user)
    } else {
        tracing::debug!("Password mismatch for {}", credentials.email());
        Err(AuthError::InvalidCredentials)
    }
}

/// Run the password comparison on the blocking pool. Without a stored hash the
/// verifier still does the work of one comparison and the result is a mismatch.
async fn check_password<P: PasswordVerifier>(
    passwords: &P,
    plaintext: &str,
    hash: Option<&str>,
) -> bool {
    let passwords = passwords.clone();
    let plaintext = plaintext.to_owned();
    let hash = hash.map(str::to_owned);

    let outcome = tokio::task::spawn_blocking(move || match hash {
        Some(hash) => passwords.verify(&plaintext, &hash),
        None => {
            passwords.verify_absent(&plaintext);
            false
        }
    })
    .await;

    outcome.unwrap_or_else(|e| {
        tracing::error!("Password check task failed: {}", e);
        false
    })
}

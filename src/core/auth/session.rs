//! Request-facing session view
//!
//! A `Session` is rebuilt from a validated token on every request and is never
//! stored anywhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::auth::jwt::{SessionClaims, SessionToken};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

impl Session {
    /// Default session for a token: display fields only, no id or role
    pub fn base(token: &SessionToken) -> Self {
        Self {
            user: SessionUser {
                id: None,
                email: Some(token.claims().email.clone()),
                name: token.claims().name.clone(),
                role: None,
            },
            expires: token.expires_at(),
        }
    }

    /// Base session with all claims projected onto it
    pub fn from_token(token: &SessionToken) -> Self {
        materialize(token.claims(), Self::base(token))
    }
}

/// Copy `id`, `role`, `email` and `name` from the claims onto the session user,
/// overwriting whatever the base session carried.
pub fn materialize(claims: &SessionClaims, base: Session) -> Session {
    Session {
        user: SessionUser {
            id: Some(claims.sub.clone()),
            email: Some(claims.email.clone()),
            name: claims.name.clone(),
            role: claims.role.clone(),
        },
        ..base
    }
}

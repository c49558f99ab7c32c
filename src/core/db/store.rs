//! User store contract
//!
//! The authentication core only ever reads users by email. The store handle is
//! passed explicitly into the credential verifier and the refresh routines.

use std::future::Future;

use crate::core::db::models::User;

/// User store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only user lookup.
///
/// `Ok(None)` means the store answered and has no such user; `Err` means the
/// store could not answer at all. Callers translate both into their own
/// fail-closed or fail-soft behavior.
pub trait UserStore: Clone + Send + Sync + 'static {
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}

//! In-memory user store
//!
//! Backed by a `DashMap` keyed by email. Used by tests and local runs without
//! a database. Can be switched into an "unavailable" mode to simulate outages.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::core::db::models::User;
use crate::core::db::store::{StoreError, UserStore};

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<String, User>>,
    unavailable: Arc<AtomicBool>,
    lookups: Arc<AtomicUsize>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user, keyed by its email
    pub fn insert(&self, user: User) {
        self.users.insert(user.email.clone(), user);
    }

    pub fn remove(&self, email: &str) -> Option<User> {
        self.users.remove(email).map(|(_, user)| user)
    }

    /// Change a user's role in place. Returns false if the user does not exist.
    pub fn set_role(&self, email: &str, role: impl Into<String>) -> bool {
        match self.users.get_mut(email) {
            Some(mut user) => {
                user.role = role.into();
                true
            }
            None => false,
        }
    }

    /// Change a user's display name in place. Returns false if the user does not exist.
    pub fn set_name(&self, email: &str, name: impl Into<String>) -> bool {
        match self.users.get_mut(email) {
            Some(mut user) => {
                user.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Make every subsequent lookup fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups performed so far, including failed ones
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl UserStore for MemoryUserStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }

        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(email, "Test User", "user", "hash")
    }

    #[tokio::test]
    async fn test_find_existing_user() {
        let store = MemoryUserStore::new();
        store.insert(user("a@b.com"));

        let found = store.find_user_by_email("a@b.com").await.unwrap();
        assert_eq!(found.unwrap().email, "a@b.com");
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_find_missing_user() {
        let store = MemoryUserStore::new();

        let found = store.find_user_by_email("nobody@b.com").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_lookups() {
        let store = MemoryUserStore::new();
        store.insert(user("a@b.com"));
        store.set_unavailable(true);

        let result = store.find_user_by_email("a@b.com").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.lookup_count(), 1);

        store.set_unavailable(false);
        assert!(store.find_user_by_email("a@b.com").await.unwrap().is_some());
    }

    #[test]
    fn test_set_role_and_name() {
        let store = MemoryUserStore::new();
        store.insert(user("a@b.com"));

        assert!(store.set_role("a@b.com", "admin"));
        assert!(store.set_name("a@b.com", "Renamed"));
        assert!(!store.set_role("missing@b.com", "admin"));

        let stored = store.users.get("a@b.com").unwrap();
        assert_eq!(stored.role, "admin");
        assert_eq!(stored.name, "Renamed");
    }

    #[test]
    fn test_clones_share_state() {
        let store = MemoryUserStore::new();
        let clone = store.clone();
        clone.insert(user("a@b.com"));

        assert!(store.users.contains_key("a@b.com"));
        assert!(store.remove("a@b.com").is_some());
        assert!(clone.users.is_empty());
    }
}

//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.
//! Session token settings live in [`crate::core::auth::SessionConfig`].

use crate::core::db::DbConfig;

/// Default listen address
pub const DEFAULT_SITE_ADDR: &str = "127.0.0.1:3000";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// User store connection, present when DATABASE_URL is set.
    /// Its Debug output hides the URL credentials.
    pub database: Option<DbConfig>,

    /// Address the HTTP server binds to
    pub site_addr: String,

    /// Whether a session signing secret is present (the secret itself is
    /// read by `SessionConfig`)
    pub has_auth_secret: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            database: DbConfig::from_vars(&var),
            site_addr: var("SITE_ADDR").unwrap_or_else(|| DEFAULT_SITE_ADDR.to_string()),
            has_auth_secret: var("AUTH_SECRET").is_some_and(|v| !v.is_empty()),
        }
    }

    /// Check if database is configured
    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }
}

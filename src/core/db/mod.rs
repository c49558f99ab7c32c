//! User storage for the authentication core
//!
//! The `UserStore` trait is the only thing the auth pipeline depends on.
//! `UserRepository` implements it over PostgreSQL, `MemoryUserStore` in memory.

pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod store;

// Re-export commonly used items
pub use memory::MemoryUserStore;
pub use models::User;
pub use pool::{DbConfig, DbError, create_pool};
pub use repositories::UserRepository;
pub use store::{StoreError, UserStore};

// Re-export sqlx types that might be needed
pub use sqlx::PgPool;

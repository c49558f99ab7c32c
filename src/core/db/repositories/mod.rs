//! Database repositories
//!
//! Repositories encapsulate data access against PostgreSQL.

pub mod user;

pub use user::UserRepository;

//! User repository for database operations
//!
//! Read-only lookups against the PostgreSQL `users` table. Password hashes are
//! stored in the `password` column and are compared by the credential
//! verifier, never here.

use sqlx::PgPool;

use crate::core::db::models::User;
use crate::core::db::store::{StoreError, UserStore};

/// User repository backed by a PostgreSQL pool
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, role, password AS password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

impl UserStore for UserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_by_email(email).await.inspect_err(|e| {
            tracing::error!("Failed to fetch user: {}", e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(
            format!("{}", err),
            "User store unavailable: connection refused"
        );

        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(format!("{}", err).starts_with("Database error:"));
    }

    // ========================================================================
    // Integration Tests (require database)
    // ========================================================================

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_find_by_email_missing_user() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool);

        let user = repo
            .find_user_by_email("definitely-missing@example.com")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    #[ignore = "requires running PostgreSQL database"]
    async fn test_find_by_email_existing_user() {
        let pool = create_test_pool().await;
        let repo = UserRepository::new(pool.clone());

        let seeded = User::new(
            format!("repo-test-{}@example.com", uuid::Uuid::new_v4()),
            "Repo Test",
            "user",
            bcrypt::hash("secret123", 4).unwrap(),
        );
        sqlx::query("INSERT INTO users (id, name, email, password, role) VALUES ($1, $2, $3, $4, $5)")
            .bind(seeded.id)
            .bind(&seeded.name)
            .bind(&seeded.email)
            .bind(&seeded.password_hash)
            .bind(&seeded.role)
            .execute(&pool)
            .await
            .unwrap();

        let found = repo.find_user_by_email(&seeded.email).await.unwrap().unwrap();
        assert_eq!(found.id, seeded.id);
        assert_eq!(found.role, "user");
        assert_eq!(found.password_hash, seeded.password_hash);

        // Cleanup
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(seeded.id)
            .execute(&pool)
            .await
            .unwrap();
    }

    // Helper function to create test pool
    async fn create_test_pool() -> PgPool {
        use crate::core::db::pool::{DbConfig, create_pool};

        let config = DbConfig::from_vars(|name| std::env::var(name).ok())
            .expect("DATABASE_URL must be set for tests");
        create_pool(&config).expect("Failed to create test pool")
    }
}

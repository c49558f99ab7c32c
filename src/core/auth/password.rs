//! Password hash comparison
//!
//! The credential verifier only needs a yes/no answer for a plaintext and a
//! stored hash. `BcryptVerifier` is the production implementation.

use std::sync::LazyLock;

/// Stand-in hash compared against when the email has no user, at the same
/// cost as freshly stored hashes.
static ABSENT_USER_HASH: LazyLock<String> = LazyLock::new(|| {
    bcrypt::hash("dashboard-absent-user", bcrypt::DEFAULT_COST).unwrap_or_else(|e| {
        tracing::error!("Failed to build stand-in password hash: {}", e);
        String::new()
    })
});

/// One-way password verification primitive
pub trait PasswordVerifier: Clone + Send + Sync + 'static {
    /// Returns true when `plaintext` matches `hash`. Malformed hashes never match.
    fn verify(&self, plaintext: &str, hash: &str) -> bool;

    /// Spend the work of one `verify` when there is no stored hash, so an
    /// unknown email takes as long as a wrong password.
    fn verify_absent(&self, plaintext: &str) {
        let _ = plaintext;
    }
}

/// bcrypt-backed verifier
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl PasswordVerifier for BcryptVerifier {
    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match bcrypt::verify(plaintext, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    fn verify_absent(&self, plaintext: &str) {
        let _ = bcrypt::verify(plaintext, ABSENT_USER_HASH.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hash(password: &str) -> String {
        bcrypt::hash(password, 4).unwrap()
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = cheap_hash("correct_password");
        assert!(BcryptVerifier.verify("correct_password", &hash));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = cheap_hash("correct_password");
        assert!(!BcryptVerifier.verify("wrong_password", &hash));
    }

    #[test]
    fn test_verify_password_unicode() {
        let password = "пароль_密码_🔐";
        let hash = cheap_hash(password);
        assert!(BcryptVerifier.verify(password, &hash));
    }

    #[test]
    fn test_verify_password_invalid_hash_format() {
        assert!(!BcryptVerifier.verify("password", "not_a_valid_hash"));
        assert!(!BcryptVerifier.verify("password", ""));
    }

    #[test]
    fn test_absent_user_hash_is_a_full_cost_hash() {
        let hash = ABSENT_USER_HASH.as_str();

        assert!(hash.starts_with(&format!("$2b${:02}$", bcrypt::DEFAULT_COST)));
        assert!(bcrypt::verify("password", hash).is_ok());
        assert!(!BcryptVerifier.verify("password", hash));
    }
}

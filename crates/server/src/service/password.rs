use anyhow::{Result, anyhow};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

/// Hashes `password` into an Argon2id PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("failed to hash password: {e}"))
}

/// Checks `password` against a stored PHC string. A malformed stored hash
/// never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Runs [`hash_password`] on tokio's blocking pool.
pub async fn hash_password_task(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| anyhow!("password hashing task failed: {e}"))?
}

/// Runs [`verify_password`] on tokio's blocking pool.
pub async fn verify_password_task(password: String, stored_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| anyhow!("password verification task failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("student123").expect("hashing should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("student123", &hash));
        assert!(!verify_password("student124", &hash));
    }

    #[test]
    fn same_password_gets_different_salts() {
        let first = hash_password("teacher123").expect("hashing should succeed");
        let second = hash_password("teacher123").expect("hashing should succeed");
        assert_ne!(first, second);
    }

    #[test]
    fn plaintext_stored_value_never_verifies() {
        assert!(!verify_password("admin123", "admin123"));
    }

    #[tokio::test]
    async fn blocking_pool_helpers_agree_with_sync_versions() {
        let hash = hash_password_task("student123".to_string())
            .await
            .expect("hashing should succeed");

        assert!(verify_password("student123", &hash));
        assert!(verify_password_task("student123".to_string(), hash.clone())
            .await
            .expect("verification task should finish"));
        assert!(!verify_password_task("student124".to_string(), hash)
            .await
            .expect("verification task should finish"));
    }
}

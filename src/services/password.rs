// src/services/password.rs
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashFailed(String),
}

/// Hash a plaintext password with a random salt (argon2id, default params)
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashFailed(e.to_string()))
}

/// Verify a plaintext password against a stored PHC-format digest.
///
/// An unparseable digest verifies as false, the same as a wrong password;
/// callers never learn which.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let digest = hash_password("secret1").unwrap();

        assert_ne!(digest, "secret1");
        assert!(verify_password("secret1", &digest));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let digest = hash_password("secret1").unwrap();

        assert!(!verify_password("secret2", &digest));
        assert!(!verify_password("", &digest));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("secret1").unwrap();
        let second = hash_password("secret1").unwrap();

        // Random salt means identical passwords never share a digest
        assert_ne!(first, second);
        assert!(verify_password("secret1", &first));
        assert!(verify_password("secret1", &second));
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        assert!(!verify_password("secret1", "not-a-phc-string"));
    }
}

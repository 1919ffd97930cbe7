//! Salted argon2id password hashing

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hashing(argon2::password_hash::Error),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(argon2::password_hash::Error),
}

/// Hash a password into a PHC string (algorithm, parameters and salt included)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hashing)
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(PasswordError::MalformedHash)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secr3t!pass").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Secr3t!pass"));
        assert!(verify_password("Secr3t!pass", &hash).unwrap());
        assert!(!verify_password("secr3t!pass", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("Secr3t!pass").unwrap();
        let second = hash_password("Secr3t!pass").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash() {
        let result = verify_password("anything", "plaintext");
        assert!(matches!(result, Err(PasswordError::MalformedHash(_))));
    }
}

//! Password hashing with bcrypt (salted, fixed work factor).

use bcrypt::BcryptError;

use crate::config;

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, config::BCRYPT_COST)
}

/// Verify a password against a stored hash.
/// Returns Ok(false) on mismatch; errors only if the stored hash is malformed.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, BcryptError> {
    bcrypt::verify(password, hashed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("secret", &first).unwrap());
        assert!(verify_password("secret", &second).unwrap());
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let hash = hash_password("secret").unwrap();
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("secret", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn test_hash_carries_work_factor() {
        // bcrypt encodes the cost in the hash string: $2b$10$...
        let hash = hash_password("secret").unwrap();
        assert!(hash.starts_with("$2b$10$"), "unexpected hash prefix: {}", hash);
    }
}

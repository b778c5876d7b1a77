use thiserror::Error;

/// Lowest work factor bcrypt accepts; only for tests and local runs
pub const MIN_BCRYPT_COST: u32 = 4;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[source] bcrypt::BcryptError),

    #[error("Stored password hash is invalid: {0}")]
    InvalidHash(#[source] bcrypt::BcryptError),
}

/// Hash password for storage.
///
/// bcrypt draws a fresh random salt per call, so hashing the same
/// plaintext twice gives two different strings that both verify.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(PasswordError::Hash)
}

/// Verify password against stored hash.
///
/// `Ok(false)` means a well-formed hash that does not match; a malformed
/// stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash).map_err(PasswordError::InvalidHash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verify() {
        let first = hash_password("test_password", MIN_BCRYPT_COST).unwrap();
        let second = hash_password("test_password", MIN_BCRYPT_COST).unwrap();

        assert_ne!(first, second);
        assert_ne!(first, "test_password");
        assert!(verify_password("test_password", &first).unwrap());
        assert!(verify_password("test_password", &second).unwrap());
        assert!(!verify_password("other", &first).unwrap());
    }

    #[test]
    fn minimum_cost_hashes_verify() {
        let hashed = hash_password("pw", MIN_BCRYPT_COST).unwrap();
        assert!(hashed.starts_with("$2b$04$"));
        assert!(verify_password("pw", &hashed).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("pw", "plaintext-not-a-hash"),
            Err(PasswordError::InvalidHash(_))
        ));
    }
}

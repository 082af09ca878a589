//! Password hashing
//!
//! Plain passwords never leave this module in any other form than an Argon2 PHC string.

use argon2::Argon2;
use argon2::password_hash::Error;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;

/// Generate a random secret, used when no JWT secret is configured
pub fn generate() -> String {
    SaltString::generate(&mut OsRng).to_string()
}

/// Hash a password with a fresh salt
pub fn hash(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    let hashed_password = Argon2::default().hash_password(password.as_bytes(), &salt)?;

    Ok(hashed_password.to_string())
}

/// Verify a password against a stored hash
///
/// A stored hash that can not be parsed never verifies
pub fn verify(hashed_password: &str, password: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hashed_password) else {
        tracing::warn!("Stored password hash could not be parsed");

        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed_password = hash("correct horse").unwrap();

        assert_ne!("correct horse", hashed_password);
        assert!(verify(&hashed_password, "correct horse"));
        assert!(!verify(&hashed_password, "battery staple"));
    }

    #[test]
    fn test_same_password_different_hash() {
        assert_ne!(hash("secret").unwrap(), hash("secret").unwrap());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        assert!(!verify("not-a-hash", "not-a-hash"));
    }
}

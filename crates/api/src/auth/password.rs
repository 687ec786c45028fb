//! Password hashing (Argon2id) and strength checks.
//!
//! Hashes are stored as PHC strings, so the algorithm parameters and the
//! per-password random salt travel inside the hash itself and verification
//! needs no extra bookkeeping.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    // Default parameters select Argon2id.
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; `Err` means the stored hash itself is
/// malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Enforce the minimum length, counting characters rather than bytes so
/// multi-byte Hangul counts the way users count. The error is the Korean
/// message the handler returns as-is.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!("비밀번호는 최소 {min_length}자 이상이어야 합니다"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_argon2id_phc_hashes_that_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_ok_false_not_err() {
        let hash = hash_password("real-password").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn short_passwords_get_the_korean_message() {
        let msg = validate_password_strength("short", MIN_PASSWORD_LENGTH).unwrap_err();
        assert!(msg.contains("10자"));
    }

    #[test]
    fn length_is_counted_in_characters() {
        // 10 Hangul syllables are 30 UTF-8 bytes but still pass.
        assert!(validate_password_strength("비밀번호비밀번호열자", 10).is_ok());
        assert!(validate_password_strength("ten__chars", 10).is_ok());
        assert!(validate_password_strength("아홉자비밀번호입니", 10).is_err());
    }
}

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;
use thiserror::Error;

/// Hash checked when a login names no known teacher, so both paths cost one Argon2 run
pub(crate) static DECOY_HASH: OnceLock<Option<String>> = OnceLock::new();

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Hashes a password with Argon2id and a random salt, returning a PHC string for storage.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Checks a password against a stored PHC string.
///
/// The salt and parameters come from the stored hash; digest comparison is
/// constant-time inside the verifier. A stored value that is not a PHC string
/// (e.g. a legacy plaintext password) is reported as `InvalidHashFormat`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::InvalidHashFormat)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Runs a verification that always fails, taking as long as a real one.
pub fn verify_decoy(password: &str) {
    let decoy = DECOY_HASH.get_or_init(|| hash_password("no-such-teacher").ok());
    if let Some(hash) = decoy {
        let _ = verify_password(password, hash);
    }
}

use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes a plaintext password with a fresh random salt.
///
/// Two calls with the same input produce different digests; both verify.
/// The cost comes from configuration, not a hardcoded constant.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {}", e)))
}

/// Checks `password` against a stored bcrypt hash.
///
/// A malformed stored hash (corrupted data) counts as a mismatch rather
/// than an error: login must answer "invalid credentials" either way, and
/// the parse failure is only worth a server-side warning.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match verify(password, password_hash) {
        Ok(matched) => matched,
        Err(e) => {
            log::warn!("stored password hash could not be verified: {}", e);
            false
        }
    }
}

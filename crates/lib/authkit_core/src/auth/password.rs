//! Password hashing via bcrypt.

use super::AuthError;

/// bcrypt cost factor used unless configured otherwise.
pub const DEFAULT_HASH_COST: u32 = 10;

/// Lowest cost bcrypt accepts.
pub const MIN_HASH_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_HASH_COST: u32 = 31;

/// Hash a password with bcrypt at the given cost. Each call draws a fresh salt.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// `Ok(false)` is an ordinary mismatch; `Err` means the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

//! Authentication and authorization logic.
//!
//! Password hashing, the permission ceiling check, token signing and the
//! [`Authenticator`](authenticator::Authenticator) facade that ties them to
//! an identity store.

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod permissions;

use thiserror::Error;

use self::permissions::Permission;
use crate::config::ConfigError;
use crate::store::StoreError;

/// Authentication errors.
///
/// `CredentialMismatch`, `PermissionExceeded` and `Store(NotFound)` are
/// normal outcomes of a login attempt. Only [`is_retryable`](Self::is_retryable)
/// errors point at the infrastructure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialMismatch,

    #[error("Requested permission {requested} exceeds maximum permission {max}")]
    PermissionExceeded {
        requested: Permission,
        max: Permission,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Store(e) if e.is_retryable())
    }
}

//! Permission levels and the issuance ceiling check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AuthError;

/// An ordered permission tier. Higher levels carry more authority.
///
/// Comparison is plain integer ordering. The named levels cover the usual
/// tiers, but any integer is accepted so callers can extend the scale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Permission(i64);

impl Permission {
    /// Machine-to-machine access.
    pub const API: Permission = Permission(0);
    /// Regular signed-in user.
    pub const USER: Permission = Permission(1);
    /// Administrator.
    pub const ADMIN: Permission = Permission(2);

    pub const fn new(level: i64) -> Self {
        Self(level)
    }

    /// Raw integer level, as stored and encoded in tokens.
    pub const fn level(self) -> i64 {
        self.0
    }
}

impl From<i64> for Permission {
    fn from(level: i64) -> Self {
        Self(level)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Permission::API => write!(f, "api"),
            Permission::USER => write!(f, "user"),
            Permission::ADMIN => write!(f, "admin"),
            Permission(level) => write!(f, "{level}"),
        }
    }
}

/// Error returned when a permission name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown permission level: {0}")]
pub struct ParsePermissionError(String);

impl FromStr for Permission {
    type Err = ParsePermissionError;

    /// Accepts `api`, `user`, `admin` (any case) or a bare integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Permission::API),
            "user" => Ok(Permission::USER),
            "admin" => Ok(Permission::ADMIN),
            other => other
                .parse::<i64>()
                .map(Permission)
                .map_err(|_| ParsePermissionError(s.to_string())),
        }
    }
}

/// Check that `requested` does not exceed the identity's `ceiling`.
pub fn ensure_within(requested: Permission, ceiling: Permission) -> Result<(), AuthError> {
    if requested > ceiling {
        return Err(AuthError::PermissionExceeded {
            requested,
            max: ceiling,
        });
    }
    Ok(())
}

//! # authkit_core
//!
//! Identity registration, credential verification and signed-token
//! issuance for Authkit.

pub mod auth;
pub mod config;
pub mod db;
pub mod migrate;
pub mod models;
pub mod store;

pub use auth::authenticator::Authenticator;
pub use auth::jwt::ValidationError;
pub use auth::permissions::Permission;
pub use auth::AuthError;
pub use config::{AuthConfig, ConfigError};
pub use models::claims::Claims;
pub use models::identity::{Identity, IdentityDraft};
pub use store::{IdentityStore, StoreError};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Identity persistence.
//!
//! `IdentityStore` is the storage capability the authenticator depends on.
//! Two backends are provided: [`postgres::PgIdentityStore`] over a shared
//! `PgPool`, and [`memory::InMemoryIdentityStore`] for tests and embedding.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::identity::Identity;

pub use memory::InMemoryIdentityStore;
pub use postgres::PgIdentityStore;

/// Identity store errors.
///
/// `NotFound` and `ConstraintViolation` are ordinary outcomes. `Unavailable`
/// is an infrastructure fault the caller may retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Identity not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::ConstraintViolation(db.message().to_string())
            }
            other => StoreError::Unavailable(other),
        }
    }
}

/// Keyed identity storage with upsert-by-id semantics.
///
/// Implementations must keep at most one record per email: an upsert whose
/// email is owned by a different id fails with `ConstraintViolation`.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert the identity, or overwrite the mutable fields of the record
    /// with the same id. `created_at` of an existing record is kept.
    async fn upsert(&self, identity: &Identity) -> Result<(), StoreError>;

    /// Exact-match lookup by email, ignoring soft-deleted records.
    async fn find_by_email(&self, email: &str) -> Result<Identity, StoreError>;

    /// Lookup by id, ignoring soft-deleted records.
    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError>;

    /// Backend name for logging.
    fn backend(&self) -> &'static str;
}

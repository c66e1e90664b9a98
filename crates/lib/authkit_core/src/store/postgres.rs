//! PostgreSQL-backed identity store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{IdentityStore, StoreError};
use crate::auth::permissions::Permission;
use crate::models::identity::Identity;

/// Column tuple read back from the `identities` table.
type IdentityRow = (
    Uuid,
    String,
    String,
    i64,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

/// Identity store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn identity_from_row(row: IdentityRow) -> Identity {
    let (
        id,
        email,
        credential_hash,
        level,
        first_name,
        last_name,
        created_at,
        updated_at,
        deleted_at,
    ) = row;
    Identity {
        id,
        email,
        credential_hash,
        max_permission_level: Permission::new(level),
        first_name,
        last_name,
        created_at,
        updated_at,
        deleted_at,
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn upsert(&self, identity: &Identity) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO identities \
               (id, email, credential_hash, max_permission_level, first_name, last_name, \
                created_at, updated_at, deleted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
               email = EXCLUDED.email, \
               credential_hash = EXCLUDED.credential_hash, \
               max_permission_level = EXCLUDED.max_permission_level, \
               first_name = EXCLUDED.first_name, \
               last_name = EXCLUDED.last_name, \
               updated_at = EXCLUDED.updated_at, \
               deleted_at = EXCLUDED.deleted_at",
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.credential_hash)
        .bind(identity.max_permission_level.level())
        .bind(identity.first_name.as_deref())
        .bind(identity.last_name.as_deref())
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .bind(identity.deleted_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Identity, StoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, credential_hash, max_permission_level, first_name, last_name, \
                    created_at, updated_at, deleted_at \
             FROM identities WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(identity_from_row)
            .ok_or_else(|| StoreError::NotFound(format!("no identity with email '{email}'")))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, credential_hash, max_permission_level, first_name, last_name, \
                    created_at, updated_at, deleted_at \
             FROM identities WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(identity_from_row)
            .ok_or_else(|| StoreError::NotFound(format!("no identity with id {id}")))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::identity::IdentityDraft;

    /// Connects to the database named by `AUTHKIT_TEST_DATABASE_URL`, or
    /// returns `None` so the test is skipped.
    async fn test_store() -> Option<PgIdentityStore> {
        let url = std::env::var("AUTHKIT_TEST_DATABASE_URL").ok()?;
        let pool = crate::db::connect(&url, 2, Duration::from_secs(10))
            .await
            .expect("connect to test database");
        crate::migrate::migrate(&pool).await.expect("migrate");
        Some(PgIdentityStore::new(pool))
    }

    fn identity(email: &str) -> Identity {
        Identity::from_draft(
            IdentityDraft::new(email, Permission::USER),
            Uuid::new_v4(),
            "hash".into(),
            // Postgres keeps microseconds; truncate so round-trips compare equal.
            DateTime::<Utc>::from_timestamp(Utc::now().timestamp(), 0).unwrap(),
        )
    }

    fn unique_email() -> String {
        format!("{}@authkit.test", Uuid::new_v4())
    }

    #[tokio::test]
    async fn upsert_and_find_round_trip() {
        let Some(store) = test_store().await else {
            return;
        };
        let id = identity(&unique_email());
        store.upsert(&id).await.unwrap();

        assert_eq!(store.find_by_email(&id.email).await.unwrap(), id);
        assert_eq!(store.find_by_id(id.id).await.unwrap(), id);
    }

    #[tokio::test]
    async fn upsert_same_id_keeps_one_row_with_latest_fields() {
        let Some(store) = test_store().await else {
            return;
        };
        let mut id = identity(&unique_email());
        id.first_name = Some("First".into());
        store.upsert(&id).await.unwrap();
        id.first_name = Some("Second".into());
        store.upsert(&id).await.unwrap();

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM identities WHERE id = $1")
            .bind(id.id)
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        let stored = store.find_by_id(id.id).await.unwrap();
        assert_eq!(stored.first_name.as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_constraint_violation() {
        let Some(store) = test_store().await else {
            return;
        };
        let email = unique_email();
        store.upsert(&identity(&email)).await.unwrap();

        let err = store.upsert(&identity(&email)).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn missing_email_is_not_found() {
        let Some(store) = test_store().await else {
            return;
        };
        let err = store.find_by_email(&unique_email()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}

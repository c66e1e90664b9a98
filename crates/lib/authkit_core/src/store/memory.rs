//! In-memory identity store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IdentityStore, StoreError};
use crate::models::identity::Identity;

/// Identity store held in process memory, keyed by id.
///
/// A single lock guards the whole map so the email uniqueness check and the
/// write happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    records: RwLock<HashMap<Uuid, Identity>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, including soft-deleted ones.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn upsert(&self, identity: &Identity) -> Result<(), StoreError> {
        let mut records = self.records.write().await;

        if records
            .values()
            .any(|r| r.email == identity.email && r.id != identity.id)
        {
            return Err(StoreError::ConstraintViolation(format!(
                "email '{}' is already registered",
                identity.email
            )));
        }

        let mut record = identity.clone();
        if let Some(existing) = records.get(&identity.id) {
            record.created_at = existing.created_at;
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Identity, StoreError> {
        self.records
            .read()
            .await
            .values()
            .find(|r| r.email == email && !r.is_deleted())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("no identity with email '{email}'")))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError> {
        self.records
            .read()
            .await
            .get(&id)
            .filter(|r| !r.is_deleted())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("no identity with id {id}")))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

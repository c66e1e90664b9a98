//! Registered identities.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::permissions::Permission;

/// Caller-supplied fields for a new identity.
///
/// The id, credential hash and timestamps are filled in at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDraft {
    pub email: String,
    pub max_permission_level: Permission,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl IdentityDraft {
    pub fn new(email: impl Into<String>, max_permission_level: Permission) -> Self {
        Self {
            email: email.into(),
            max_permission_level,
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_name(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }
}

/// A registered principal as held by an identity store.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Primary key. Assigned once at registration.
    pub id: Uuid,
    /// Unique, matched exactly on lookup.
    pub email: String,
    /// bcrypt output. Never the plaintext password.
    pub credential_hash: String,
    /// Highest permission a token for this identity may carry.
    pub max_permission_level: Permission,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker. Deleted identities are invisible to lookups.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Build a fresh identity from a draft.
    pub fn from_draft(
        draft: IdentityDraft,
        id: Uuid,
        credential_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email: draft.email,
            credential_hash,
            max_permission_level: draft.max_permission_level,
            first_name: draft.first_name,
            last_name: draft.last_name,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("credential_hash", &"<redacted>")
            .field("max_permission_level", &self.max_permission_level)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_draft_copies_fields_and_stamps_times() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let draft = IdentityDraft::new("a@b.com", Permission::USER)
            .with_name(Some("Ada".into()), Some("Lovelace".into()));
        let identity = Identity::from_draft(draft, id, "hash".into(), now);

        assert_eq!(identity.id, id);
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.max_permission_level, Permission::USER);
        assert_eq!(identity.first_name.as_deref(), Some("Ada"));
        assert_eq!(identity.created_at, now);
        assert_eq!(identity.updated_at, now);
        assert!(!identity.is_deleted());
    }

    #[test]
    fn debug_redacts_credential_hash() {
        let draft = IdentityDraft::new("a@b.com", Permission::API);
        let identity = Identity::from_draft(draft, Uuid::new_v4(), "$2b$secret".into(), Utc::now());
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains("$2b$secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

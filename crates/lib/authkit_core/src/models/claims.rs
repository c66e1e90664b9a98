//! Token claims.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identity::Identity;
use crate::auth::permissions::Permission;

/// Claims embedded in a signed token.
///
/// Field names on the wire are fixed: `user_uuid`, `permissions`, `email`,
/// `data`, `exp`, `iat`. Absent `data` and `exp` are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id at issuance.
    #[serde(rename = "user_uuid")]
    pub subject_id: Uuid,
    /// Permission granted by this token. Never above the identity's ceiling
    /// at issuance time.
    #[serde(rename = "permissions")]
    pub granted_permission: Permission,
    /// Identity email at issuance.
    pub email: String,
    /// Caller-chosen passthrough data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
    /// Expiry (unix seconds). `None` means the token never expires.
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Issued at (unix seconds).
    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
}

impl Claims {
    /// Build claims for `identity` at `granted_permission`.
    ///
    /// A zero `ttl` produces a token without an `exp` claim. Sub-second
    /// remainders round up, so any non-zero ttl expires at least one second
    /// after `now`.
    pub fn new(
        identity: &Identity,
        granted_permission: Permission,
        data: Option<BTreeMap<String, String>>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let issued_at = now.timestamp();
        let expires_at = (!ttl.is_zero()).then(|| {
            let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
            issued_at.saturating_add(i64::try_from(secs).unwrap_or(i64::MAX))
        });
        Self {
            subject_id: identity.id,
            granted_permission,
            email: identity.email.clone(),
            data,
            expires_at,
            issued_at: Some(issued_at),
        }
    }

    /// Expiry as a timestamp, if the token expires.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}

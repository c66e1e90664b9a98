//! Authenticator facade: register, get_token, validate.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::jwt::{self, ValidationError};
use super::password::{hash_password, verify_password, DEFAULT_HASH_COST};
use super::permissions::{ensure_within, Permission};
use super::AuthError;
use crate::config::{AuthConfig, ConfigError, DEFAULT_TOKEN_TTL};
use crate::models::claims::Claims;
use crate::models::identity::{Identity, IdentityDraft};
use crate::store::{IdentityStore, InMemoryIdentityStore, PgIdentityStore};
use crate::{db, migrate};

/// Registers identities and issues/validates signed tokens.
///
/// Cloning is cheap: the store handle and signing key are shared.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn IdentityStore>,
    signing_key: Arc<[u8]>,
    default_ttl: Duration,
    hash_cost: u32,
}

impl Authenticator {
    /// Build an authenticator over `store`. An empty key is rejected.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        signing_key: impl Into<Vec<u8>>,
    ) -> Result<Self, ConfigError> {
        let signing_key = signing_key.into();
        if signing_key.is_empty() {
            return Err(ConfigError::MissingSigningKey);
        }
        Ok(Self {
            store,
            signing_key: signing_key.into(),
            default_ttl: DEFAULT_TOKEN_TTL,
            hash_cost: DEFAULT_HASH_COST,
        })
    }

    /// Authenticator over a fresh [`InMemoryIdentityStore`].
    pub fn in_memory(signing_key: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        Self::new(Arc::new(InMemoryIdentityStore::new()), signing_key)
    }

    /// Authenticator over `store` with TTL and hash cost taken from `config`.
    pub fn from_config(
        store: Arc<dyn IdentityStore>,
        config: &AuthConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(store, config.signing_key.clone())?
            .with_default_ttl(config.token_ttl)
            .with_hash_cost(config.bcrypt_cost))
    }

    /// Connect to PostgreSQL, run migrations, and build a Postgres-backed
    /// authenticator.
    pub async fn connect(config: &AuthConfig) -> Result<Self, AuthError> {
        let url = config.database_url()?;
        let pool = db::connect(url, config.max_connections, config.acquire_timeout).await?;
        migrate::migrate(&pool).await?;
        Ok(Self::from_config(
            Arc::new(PgIdentityStore::new(pool)),
            config,
        )?)
    }

    /// Lifetime used when `get_token` is called without one.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// bcrypt cost for newly registered passwords.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Register a new identity under a freshly generated id.
    ///
    /// Nothing is written unless hashing succeeds. Fails with
    /// `Store(ConstraintViolation)` when the email is taken.
    pub async fn register(
        &self,
        draft: IdentityDraft,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let credential_hash = hash_password(password, self.hash_cost)?;
        let identity = Identity::from_draft(draft, Uuid::new_v4(), credential_hash, Utc::now());

        self.store.upsert(&identity).await?;

        info!(
            identity_id = %identity.id,
            email = %identity.email,
            max_permission = %identity.max_permission_level,
            backend = self.store.backend(),
            "registered identity"
        );
        Ok(identity)
    }

    /// Authenticate `email`/`password` and issue a token at `requested`.
    ///
    /// `ttl` of `None` uses the default lifetime; `Some(Duration::ZERO)`
    /// issues a token that never expires.
    pub async fn get_token(
        &self,
        email: &str,
        password: &str,
        requested: Permission,
        ttl: Option<Duration>,
        data: Option<BTreeMap<String, String>>,
    ) -> Result<String, AuthError> {
        let identity = self.store.find_by_email(email).await.inspect_err(|e| {
            info!(email, error = %e, "token request for unknown identity");
        })?;

        if !verify_password(password, &identity.credential_hash)? {
            warn!(email, "credential mismatch");
            return Err(AuthError::CredentialMismatch);
        }

        ensure_within(requested, identity.max_permission_level).inspect_err(|_| {
            warn!(
                email,
                %requested,
                max = %identity.max_permission_level,
                "requested permission exceeds ceiling"
            );
        })?;

        let ttl = ttl.unwrap_or(self.default_ttl);
        let claims = Claims::new(&identity, requested, data, ttl, Utc::now());
        let token = jwt::issue(&claims, &self.signing_key)?;

        debug!(identity_id = %identity.id, permission = %requested, ?ttl, "issued token");
        Ok(token)
    }

    /// Verify a token with this authenticator's signing key.
    ///
    /// Does not consult the store.
    pub fn validate(&self, token: &str) -> Result<Claims, ValidationError> {
        jwt::validate(token, &self.signing_key)
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("store", &self.store.backend())
            .field("signing_key", &"<redacted>")
            .field("default_ttl", &self.default_ttl)
            .field("hash_cost", &self.hash_cost)
            .finish()
    }
}

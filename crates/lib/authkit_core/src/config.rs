//! Authenticator configuration.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::auth::password::{DEFAULT_HASH_COST, MAX_HASH_COST, MIN_HASH_COST};

/// Default token lifetime: 8 hours.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time to wait for a pooled connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing signing key (set AUTHKIT_SIGNING_KEY or JWT_SECRET)")]
    MissingSigningKey,

    #[error("Missing connection string (set DATABASE_URL)")]
    MissingConnectionString,

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Settings needed to build an [`Authenticator`](crate::Authenticator).
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret shared by every issue/validate call.
    pub signing_key: Vec<u8>,
    /// PostgreSQL connection URL. Only needed for the Postgres store.
    pub database_url: Option<String>,
    /// Lifetime applied when a token request does not name one.
    pub token_ttl: Duration,
    /// bcrypt cost factor.
    pub bcrypt_cost: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl AuthConfig {
    /// Configuration with the given key and defaults for everything else.
    pub fn new(signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_key: signing_key.into(),
            database_url: None,
            token_ttl: DEFAULT_TOKEN_TTL,
            bcrypt_cost: DEFAULT_HASH_COST,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Reads configuration from environment variables.
    ///
    /// | Variable                          | Default            |
    /// |-----------------------------------|--------------------|
    /// | `AUTHKIT_SIGNING_KEY` / `JWT_SECRET` | required        |
    /// | `DATABASE_URL`                    | none               |
    /// | `AUTHKIT_TOKEN_TTL_SECS`          | `28800` (8 hours)  |
    /// | `AUTHKIT_BCRYPT_COST`             | `10`               |
    /// | `AUTHKIT_DB_MAX_CONNECTIONS`      | `5`                |
    /// | `AUTHKIT_DB_ACQUIRE_TIMEOUT_SECS` | `30`               |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let signing_key = non_empty("AUTHKIT_SIGNING_KEY")
            .or_else(|| non_empty("JWT_SECRET"))
            .ok_or(ConfigError::MissingSigningKey)?;

        let mut config = Self::new(signing_key);
        config.database_url = non_empty("DATABASE_URL");

        if let Some(secs) = non_empty("AUTHKIT_TOKEN_TTL_SECS") {
            config.token_ttl = Duration::from_secs(parse_number("AUTHKIT_TOKEN_TTL_SECS", &secs)?);
        }
        if let Some(cost) = non_empty("AUTHKIT_BCRYPT_COST") {
            let cost: u32 = parse_number("AUTHKIT_BCRYPT_COST", &cost)?;
            if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&cost) {
                return Err(ConfigError::Invalid {
                    key: "AUTHKIT_BCRYPT_COST".into(),
                    reason: format!("must be between {MIN_HASH_COST} and {MAX_HASH_COST}"),
                });
            }
            config.bcrypt_cost = cost;
        }
        if let Some(max) = non_empty("AUTHKIT_DB_MAX_CONNECTIONS") {
            config.max_connections = parse_number("AUTHKIT_DB_MAX_CONNECTIONS", &max)?;
        }
        if let Some(secs) = non_empty("AUTHKIT_DB_ACQUIRE_TIMEOUT_SECS") {
            config.acquire_timeout =
                Duration::from_secs(parse_number("AUTHKIT_DB_ACQUIRE_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }

    /// The connection URL, or `MissingConnectionString`.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::MissingConnectionString)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_key", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

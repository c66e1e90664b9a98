//! Database migration support.
//!
//! Embeds the `identities` schema from `authkit_core/migrations/`.

use sqlx::PgPool;

/// Run all embedded migrations against the given pool.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

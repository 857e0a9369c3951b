//! Persistence for the streamshort auth core.
//!
//! - [`store`] -- the [`CredentialStore`] / [`ContentStore`] traits services depend on.
//! - [`pg`] -- PostgreSQL implementation over sqlx repositories.
//! - [`memory`] -- in-process implementation with the same conditional-write semantics.

use sqlx::postgres::PgPoolOptions;

pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::{ContentStore, CredentialStore, StoreError, StoreResult};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

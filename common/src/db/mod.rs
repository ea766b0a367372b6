//! Database pool and schema helpers

use std::path::Path;

use sqlx::{postgres::PgPoolOptions, PgPool, Pool, Postgres};
use tracing::info;

use crate::error::Result;

/// Database pool type
pub type DbPool = Pool<Postgres>;

/// Migrations shipped with the workspace
pub const DEFAULT_MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../migrations");

/// Initialize the database connection pool
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("Connected to PostgreSQL database with pool size: {}", max_connections);
    Ok(pool)
}

/// Run migrations on the database
pub async fn run_migrations(pool: &PgPool, migrations_dir: &Path) -> Result<()> {
    info!("Applying migrations from {}", migrations_dir.display());

    sqlx::migrate::Migrator::new(migrations_dir)
        .await?
        .run(pool)
        .await?;

    Ok(())
}

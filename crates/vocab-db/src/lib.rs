pub mod models;
pub mod repositories;

use anyhow::Context;
use sqlx::{PgPool, Postgres, migrate::MigrateDatabase, postgres::PgPoolOptions};

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("failed to connect to database")?;

    Ok(pool)
}

/// Create the database if it is missing, then apply the bundled migrations.
pub async fn ensure_db_and_migrate(database_url: &str, pool: &PgPool) -> anyhow::Result<()> {
    if !Postgres::database_exists(database_url).await? {
        tracing::info!("database missing, creating it");
        Postgres::create_database(database_url)
            .await
            .context("failed to create database")?;
    }

    sqlx::migrate!()
        .run(pool)
        .await
        .context("failed to run migrations")?;

    Ok(())
}

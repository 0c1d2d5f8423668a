use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::time::Duration;
use tracing::{info, instrument};

const SCHEMA: &str = include_str!("../migrations/0001_initial.sql");

/// Opens a connection pool to the database at `url`
#[instrument(skip(url))]
pub async fn connect(url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Creates any missing tables and indexes. Safe to run on every start.
#[instrument(skip(pool))]
pub async fn initialize_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    pool.execute(SCHEMA).await?;
    info!("Database schema is up to date");
    Ok(())
}

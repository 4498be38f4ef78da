use crate::error::DbError;
use configuration::DatabaseSettings;
use dotenvy::dotenv;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// `DATABASE_URL` is read from the environment, after loading a `.env` file
/// when one exists. Pool size and acquire timeout come from the settings.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    if let Err(e) = dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(&database_url)
        .await?;

    tracing::info!(max_connections = settings.max_connections, "Connected to PostgreSQL");
    Ok(pool)
}

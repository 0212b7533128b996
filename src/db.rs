use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use crate::config::AppConfig;

pub type DbPool = sqlx::PgPool;
pub type OrmConn = DatabaseConnection;

/// Connection options for `config.database_url` with the configured overrides applied.
pub fn connect_options(config: &AppConfig) -> Result<PgConnectOptions> {
    let mut options = PgConnectOptions::from_str(&config.database_url)
        .context("invalid database connection string")?;

    if let Some(mode) = config.db_ssl_mode.as_deref() {
        let mode = PgSslMode::from_str(mode).context("invalid DB_SSL_MODE")?;
        options = options.ssl_mode(mode);
    }

    if config.db_statement_timeout_ms > 0 {
        options = options.options([(
            "statement_timeout",
            config.db_statement_timeout_ms.to_string(),
        )]);
    }

    Ok(options)
}

/// Create the shared Postgres pool used by both sqlx queries and the ORM.
pub async fn create_pool(config: &AppConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(5 * 60))
        .connect_with(connect_options(config)?)
        .await?;
    Ok(pool)
}

/// Wrap the shared pool in a SeaORM connection.
pub fn create_orm_conn(pool: &DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool.clone())
}

pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn ping(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

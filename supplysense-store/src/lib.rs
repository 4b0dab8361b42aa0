//! SQLite persistence for SupplySense.
//!
//! Every operation takes the caller's [`UserContext`] and filters by its user
//! id, so rows of different users never mix.

pub mod error;
mod insights;
pub mod migrations;
mod rows;
mod sales;
pub mod schema;
mod sessions;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub use error::StoreError;
pub use supplysense_core::UserContext;

use crate::migrations::run_migrations;

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: sqlx::SqlitePool,
}

#[derive(Debug, Clone)]
pub struct SqliteStoreBuilder {
    database_url: String,
    max_connections: u32,
    create_if_missing: bool,
}

impl SqliteStore {
    pub fn builder(database_url: impl Into<String>) -> SqliteStoreBuilder {
        SqliteStoreBuilder {
            database_url: database_url.into(),
            max_connections: 1,
            create_if_missing: true,
        }
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl SqliteStoreBuilder {
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }

    pub async fn build(self) -> Result<SqliteStore, StoreError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)
            .map_err(StoreError::Connection)?
            .create_if_missing(self.create_if_missing)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await
            .map_err(StoreError::Connection)?;

        run_migrations(&pool).await?;
        tracing::debug!(database_url = %self.database_url, "sqlite store ready");

        Ok(SqliteStore { pool })
    }
}

//! Database connection and schema management.

use std::str::FromStr;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::Result;
use crate::schema;

/// Main database handle.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    url: String,
}

/// Row counts per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub diseases: i64,
    pub questions: i64,
    pub choices: i64,
    pub responses: i64,
}

impl Database {
    /// Open (and create if missing) the SQLite database at `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        info!("Connecting to database at: {}", url);

        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool, url: url.to_string() })
    }

    /// Private in-memory database. A single connection, since every
    /// SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool, url: "sqlite::memory:".to_string() })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Create all tables if they don't exist.
    pub async fn initialize(&self) -> Result<()> {
        sqlx::raw_sql(schema::MIGRATIONS).execute(&self.pool).await?;
        info!("Database initialized and migrations applied.");
        Ok(())
    }

    pub async fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            diseases: self.count(schema::TABLE_DISEASES).await?,
            questions: self.count(schema::TABLE_QUESTIONS).await?,
            choices: self.count(schema::TABLE_CHOICES).await?,
            responses: self.count(schema::TABLE_RESPONSES).await?,
        })
    }

    async fn count(&self, table: &str) -> Result<i64> {
        // Table names come from the constants in `schema`, never from input.
        let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

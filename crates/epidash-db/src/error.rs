//! Database error types.

use epidash_common::EpidashError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl DbError {
    /// Connection-level failures (pool closed, refused, permissions) as
    /// opposed to a bad statement.
    pub fn is_unavailable(&self) -> bool {
        match self {
            DbError::Sqlx(e) => matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::Configuration(_)
            ) || e.to_string().to_lowercase().contains("access denied"),
            _ => false,
        }
    }
}

impl From<DbError> for EpidashError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) | DbError::InvalidQuery(_) => EpidashError::InvalidInput(err.to_string()),
            e if e.is_unavailable() => EpidashError::Unavailable(e.to_string()),
            e => EpidashError::Other(anyhow::Error::new(e)),
        }
    }
}

//! Error type for `covid-query-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The connection string does not name a SQLite database.
  #[error("unsupported connection string: {0:?}")]
  UnsupportedBackend(String),

  /// No connection became free within the pool timeout.
  #[error("connection pool exhausted after {0:?}")]
  PoolExhausted(std::time::Duration),

  #[error("connection pool closed")]
  PoolClosed,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! A bounded pool of [`tokio_rusqlite`] connections.
//!
//! `pool_size` connections are opened up front and kept for the life of the
//! pool. Up to `max_overflow` more are opened on demand and closed when
//! released. Checkouts beyond `pool_size + max_overflow` wait for a free
//! slot for at most `timeout`, then fail with [`Error::PoolExhausted`].

use std::{
  ops::Deref,
  path::PathBuf,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
  time::Duration,
};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{Error, Result, schema::PRAGMAS};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Target ──────────────────────────────────────────────────────────────────

/// Where connections point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  File(PathBuf),
  /// A named shared-cache in-memory database, private to this process.
  Memory(String),
}

impl Target {
  /// A fresh in-memory database.
  pub fn memory() -> Self { Target::Memory(format!("covid-query-{}", Uuid::new_v4())) }

  /// Parse `sqlite:///<path>`, `sqlite://`, `sqlite:///:memory:` or a bare
  /// path.
  pub fn parse(connection_string: &str) -> Result<Self> {
    let s = connection_string.trim();
    let rest = match s.split_once("://") {
      Some(("sqlite", rest)) => rest.strip_prefix('/').unwrap_or(rest),
      Some(_) => return Err(Error::UnsupportedBackend(s.to_owned())),
      None => s,
    };
    match rest {
      "" | ":memory:" => Ok(Self::memory()),
      path => Ok(Target::File(PathBuf::from(path))),
    }
  }

  fn uri(&self) -> String {
    match self {
      Target::File(path) => path.to_string_lossy().into_owned(),
      Target::Memory(name) => format!("file:{name}?mode=memory&cache=shared"),
    }
  }
}

async fn connect(target: &Target) -> Result<Connection> {
  let conn = Connection::open(target.uri()).await?;
  conn
    .call(|conn| {
      conn.busy_timeout(BUSY_TIMEOUT)?;
      conn.execute_batch(PRAGMAS)?;
      Ok(())
    })
    .await?;
  Ok(conn)
}

// ─── Options ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
  pub pool_size:    usize,
  pub max_overflow: usize,
  pub timeout:      Duration,
}

impl Default for PoolOptions {
  fn default() -> Self {
    Self { pool_size: 5, max_overflow: 10, timeout: Duration::from_secs(30) }
  }
}

// ─── Pool ────────────────────────────────────────────────────────────────────

struct Shared {
  target:  Target,
  options: PoolOptions,
  idle:    Mutex<Vec<Connection>>,
  permits: Arc<Semaphore>,
}

impl Shared {
  fn idle(&self) -> MutexGuard<'_, Vec<Connection>> {
    self.idle.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Cloning is cheap; clones share the same connections.
#[derive(Clone)]
pub struct Pool {
  shared: Arc<Shared>,
}

impl Pool {
  /// Open `pool_size` connections (at least one) to `target`.
  pub async fn open(target: Target, options: PoolOptions) -> Result<Self> {
    let options = PoolOptions { pool_size: options.pool_size.max(1), ..options };

    let mut idle = Vec::with_capacity(options.pool_size);
    for _ in 0..options.pool_size {
      idle.push(connect(&target).await?);
    }
    debug!(?target, ?options, "connection pool opened");

    Ok(Self {
      shared: Arc::new(Shared {
        target,
        options,
        idle: Mutex::new(idle),
        permits: Arc::new(Semaphore::new(options.pool_size + options.max_overflow)),
      }),
    })
  }

  pub fn target(&self) -> &Target { &self.shared.target }

  pub fn options(&self) -> PoolOptions { self.shared.options }

  /// Maximum number of simultaneous checkouts.
  pub fn capacity(&self) -> usize {
    self.shared.options.pool_size + self.shared.options.max_overflow
  }

  /// Connections currently checked out.
  pub fn in_use(&self) -> usize { self.capacity() - self.shared.permits.available_permits() }

  /// Open connections waiting in the pool.
  pub fn idle(&self) -> usize { self.shared.idle().len() }

  /// Check out a connection, waiting up to the pool timeout for a free slot.
  pub async fn get(&self) -> Result<PooledConnection> {
    let timeout = self.shared.options.timeout;
    let permit = tokio::time::timeout(timeout, Arc::clone(&self.shared.permits).acquire_owned())
      .await
      .map_err(|_| {
        warn!(capacity = self.capacity(), "connection pool exhausted");
        Error::PoolExhausted(timeout)
      })?
      .map_err(|_| Error::PoolClosed)?;

    let pooled = self.shared.idle().pop();
    let conn = match pooled {
      Some(conn) => conn,
      None => {
        debug!("opening overflow connection");
        connect(&self.shared.target).await?
      }
    };

    Ok(PooledConnection {
      conn:    Some(conn),
      shared:  Arc::clone(&self.shared),
      _permit: permit,
    })
  }
}

/// A checked-out connection; returned to the pool on drop.
pub struct PooledConnection {
  conn:    Option<Connection>,
  shared:  Arc<Shared>,
  _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
  type Target = Connection;

  fn deref(&self) -> &Connection {
    // Only `Drop` takes the connection out.
    self.conn.as_ref().unwrap_or_else(|| unreachable!("connection taken before drop"))
  }
}

impl Drop for PooledConnection {
  fn drop(&mut self) {
    if let Some(conn) = self.conn.take() {
      let mut idle = self.shared.idle();
      if idle.len() < self.shared.options.pool_size {
        idle.push(conn);
      }
    }
  }
}

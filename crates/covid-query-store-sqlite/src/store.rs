//! [`SqliteStore`]: the SQLite implementation of [`QueryStore`].

use covid_query_core::{
  plan::ParameterSet,
  store::{QueryStore, RowSet},
};
use tracing::{debug, info};

use crate::{
  Result,
  encode::{decode_value, encode_param},
  pool::{Pool, PoolOptions, Target},
  schema::SCHEMA,
  seed,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A COVID-19 statistics store backed by a pool of SQLite connections.
///
/// Cloning is cheap; clones share the pool.
#[derive(Clone)]
pub struct SqliteStore {
  pool: Pool,
}

impl SqliteStore {
  /// Open (or create) the store named by `connection_string` and run schema
  /// initialisation.
  pub async fn open(connection_string: &str, options: PoolOptions) -> Result<Self> {
    let target = Target::parse(connection_string)?;
    info!(?target, pool_size = options.pool_size, max_overflow = options.max_overflow, "opening store");
    Self::open_target(target, options).await
  }

  /// Open a private in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    Self::open_target(
      Target::memory(),
      PoolOptions { pool_size: 2, max_overflow: 2, ..PoolOptions::default() },
    )
    .await
  }

  pub async fn open_target(target: Target, options: PoolOptions) -> Result<Self> {
    let store = Self { pool: Pool::open(target, options).await? };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn pool(&self) -> &Pool { &self.pool }

  async fn init_schema(&self) -> Result<()> {
    let conn = self.pool.get().await?;
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert the fixed seed dataset if there are no locations yet.
  ///
  /// Returns `true` if rows were inserted.
  pub async fn seed(&self) -> Result<bool> {
    let conn = self.pool.get().await?;
    let seeded = conn
      .call(|conn| {
        let count: i64 =
          conn.query_row("SELECT COUNT(*) FROM ubicaciones", [], |row| row.get(0))?;
        if count > 0 {
          return Ok(false);
        }
        let tx = conn.transaction()?;
        seed::insert_all(&tx)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if seeded {
      info!(locations = seed::LOCATIONS.len(), "seed dataset inserted");
    }
    Ok(seeded)
  }

  /// Every city name in `ubicaciones`, in id order.
  pub async fn cities(&self) -> Result<Vec<String>> {
    let conn = self.pool.get().await?;
    let cities = conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT ciudad FROM ubicaciones ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(cities)
  }
}

// ─── QueryStore impl ─────────────────────────────────────────────────────────

impl QueryStore for SqliteStore {
  type Error = crate::Error;

  async fn execute(&self, sql: &str, params: &ParameterSet) -> Result<RowSet> {
    let sql = sql.to_owned();
    let bindings: Vec<(String, rusqlite::types::Value)> = params
      .iter()
      .map(|(name, value)| (format!(":{name}"), encode_param(value)))
      .collect();

    let conn = self.pool.get().await?;
    let rows = conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        if !stmt.readonly() {
          return Err(rusqlite::Error::InvalidQuery.into());
        }

        for (name, value) in &bindings {
          let index = stmt
            .parameter_index(name)?
            .ok_or_else(|| rusqlite::Error::InvalidParameterName(name.clone()))?;
          stmt.raw_bind_parameter(index, value)?;
        }

        let columns: Vec<String> =
          stmt.column_names().into_iter().map(str::to_owned).collect();
        let width = columns.len();

        let mut out = Vec::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next()? {
          let cells = (0..width)
            .map(|i| row.get_ref(i).map(decode_value))
            .collect::<rusqlite::Result<Vec<_>>>()?;
          out.push(cells);
        }
        Ok(RowSet::new(columns, out))
      })
      .await?;

    debug!(rows = rows.len(), "statement executed");
    Ok(rows)
  }
}

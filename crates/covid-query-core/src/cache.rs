//! Query result cache with a fixed freshness window.
//!
//! Entries are keyed by [`CacheKey`]: a SHA-256 digest of the SQL template
//! plus the bound parameters in name order, so equivalent calls collide
//! regardless of how the parameters were built. Staleness is checked lazily
//! on read. There is no capacity bound and no background eviction; the map
//! grows for the lifetime of the process.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, TimeDelta, Utc};
use sha2::{Digest, Sha256};

use crate::{
  plan::{ParamValue, ParameterSet},
  store::RowSet,
};

pub const DEFAULT_FRESHNESS_SECS: i64 = 300;

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of "now" for freshness checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

// ─── Key ─────────────────────────────────────────────────────────────────────

/// Canonical identity of a (template, parameters) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  template_digest: String,
  params:          Vec<(String, ParamValue)>,
}

impl CacheKey {
  pub fn new(sql: &str, params: &ParameterSet) -> Self {
    let template_digest = hex::encode(Sha256::digest(sql.as_bytes()));
    let params = params
      .iter()
      .map(|(name, value)| (name.to_owned(), value.clone()))
      .collect();
    Self { template_digest, params }
  }

  /// Stable string form: template digest followed by the parameters as
  /// canonical JSON.
  pub fn fingerprint(&self) -> String {
    let params: serde_json::Map<String, serde_json::Value> = self
      .params
      .iter()
      .map(|(name, value)| {
        let value = match value {
          ParamValue::Text(s) => serde_json::Value::from(s.as_str()),
          ParamValue::Integer(n) => serde_json::Value::from(*n),
        };
        (name.clone(), value)
      })
      .collect();
    format!("{}_{}", self.template_digest, serde_json::Value::Object(params))
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

struct CacheEntry {
  stored_at: DateTime<Utc>,
  rows:      Arc<RowSet>,
}

/// Shared, mutex-guarded result cache.
pub struct QueryCache<C: Clock = SystemClock> {
  entries:   Mutex<HashMap<CacheKey, CacheEntry>>,
  freshness: TimeDelta,
  clock:     C,
}

impl QueryCache<SystemClock> {
  pub fn new(freshness: TimeDelta) -> Self { Self::with_clock(freshness, SystemClock) }
}

impl Default for QueryCache<SystemClock> {
  fn default() -> Self { Self::new(TimeDelta::seconds(DEFAULT_FRESHNESS_SECS)) }
}

impl<C: Clock> QueryCache<C> {
  pub fn with_clock(freshness: TimeDelta, clock: C) -> Self {
    Self { entries: Mutex::new(HashMap::new()), freshness, clock }
  }

  pub fn freshness(&self) -> TimeDelta { self.freshness }

  fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
    // Entries are replaced whole, so a poisoned map is still consistent.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// The cached snapshot for `key`, if younger than the freshness window.
  pub fn get(&self, key: &CacheKey) -> Option<Arc<RowSet>> {
    let now = self.clock.now();
    let entries = self.lock();
    let entry = entries.get(key)?;
    (now - entry.stored_at < self.freshness).then(|| Arc::clone(&entry.rows))
  }

  /// Store `rows` under `key`, replacing any previous entry.
  pub fn put(&self, key: CacheKey, rows: Arc<RowSet>) {
    let stored_at = self.clock.now();
    self.lock().insert(key, CacheEntry { stored_at, rows });
  }

  pub fn len(&self) -> usize { self.lock().len() }

  pub fn is_empty(&self) -> bool { self.lock().is_empty() }

  pub fn clear(&self) { self.lock().clear(); }
}

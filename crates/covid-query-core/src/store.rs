//! The `QueryStore` trait and the row snapshots it returns.
//!
//! The trait is implemented by storage backends (e.g.
//! `covid-query-store-sqlite`). The pipeline depends on this abstraction, not
//! on any concrete backend.

use std::{fmt, future::Future};

use serde::Serialize;

use crate::plan::ParameterSet;

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A single result cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
}

impl Value {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => f.write_str("NULL"),
      Value::Integer(n) => write!(f, "{n}"),
      Value::Real(x) => write!(f, "{x}"),
      Value::Text(s) => f.write_str(s),
    }
  }
}

/// An immutable snapshot of a result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowSet {
  pub columns: Vec<String>,
  pub rows:    Vec<Vec<Value>>,
}

impl RowSet {
  pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
    Self { columns, rows }
  }

  /// `true` when there is nothing to show: no rows, or only rows whose every
  /// cell is NULL (an aggregate over zero matching rows).
  pub fn is_empty(&self) -> bool {
    self.rows.iter().all(|row| row.iter().all(Value::is_null))
  }

  pub fn len(&self) -> usize { self.rows.len() }

  /// The first cell of the first row, for single-value aggregates.
  pub fn scalar(&self) -> Option<&Value> { self.rows.first()?.first() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Executes parameterized statements against a relational store.
///
/// Every value in `params` must be bound by name (`:name`) and never
/// interpolated into `sql`.
pub trait QueryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run `sql` with `params` bound and return every row.
  fn execute<'a>(
    &'a self,
    sql: &'a str,
    params: &'a ParameterSet,
  ) -> impl Future<Output = Result<RowSet, Self::Error>> + Send + 'a;
}

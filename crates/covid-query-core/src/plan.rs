//! Query plans: a SQL template plus the parameters bound to it.
//!
//! User-influenced values only ever enter a plan through [`ParameterSet`];
//! the template text is assembled exclusively from `'static` fragments
//! owned by this crate.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use crate::intent::ParsedIntent;

// ─── Parameters ──────────────────────────────────────────────────────────────

/// A value bound to a named placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
  Text(String),
  Integer(i64),
}

impl fmt::Display for ParamValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ParamValue::Text(s) => write!(f, "{s:?}"),
      ParamValue::Integer(n) => write!(f, "{n}"),
    }
  }
}

impl From<&str> for ParamValue {
  fn from(s: &str) -> Self { ParamValue::Text(s.to_owned()) }
}

impl From<String> for ParamValue {
  fn from(s: String) -> Self { ParamValue::Text(s) }
}

impl From<i64> for ParamValue {
  fn from(n: i64) -> Self { ParamValue::Integer(n) }
}

/// Placeholder name → bound value, iterated in name order.
///
/// Names are stored without the leading `:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, ParamValue>);

impl ParameterSet {
  pub fn new() -> Self { Self::default() }

  /// Bind `name`, replacing any previous value.
  pub fn bind(&mut self, name: &str, value: impl Into<ParamValue>) {
    self.0.insert(name.to_owned(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&ParamValue> { self.0.get(name) }

  pub fn contains(&self, name: &str) -> bool { self.0.contains_key(name) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v))
  }
}

// ─── Filters ─────────────────────────────────────────────────────────────────

/// An optional WHERE-clause fragment and the placeholder it owns.
///
/// Each filter owns exactly one placeholder, so bindings from different
/// filters never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
  VaccineType,
  TestType,
  Location,
  DatePattern,
  LastDays,
}

impl Filter {
  pub fn placeholder(self) -> &'static str {
    match self {
      Filter::VaccineType => "tipo_vacuna",
      Filter::TestType => "tipo_prueba",
      Filter::Location => "ubicacion",
      Filter::DatePattern => "fecha",
      Filter::LastDays => "dias",
    }
  }

  pub fn clause(self) -> &'static str {
    match self {
      Filter::VaccineType => "AND tipo_vacuna = :tipo_vacuna",
      Filter::TestType => "AND tipo_prueba = :tipo_prueba",
      Filter::Location => "AND ubicaciones.ciudad = :ubicacion COLLATE NOCASE",
      Filter::DatePattern => "AND fecha LIKE '%' || :fecha || '%'",
      Filter::LastDays => "AND fecha >= date('now', '-' || :dias || ' days')",
    }
  }
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// The metric placeholder every domain template carries.
pub const METRIC_PARAM: &str = "metric";

/// A fully-resolved query: template text, bound parameters and the intent it
/// was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
  pub intent: ParsedIntent,
  base:       &'static str,
  filters:    Vec<Filter>,
  params:     ParameterSet,
}

impl QueryPlan {
  /// Start a plan from a domain template with `:metric` bound.
  pub fn new(intent: ParsedIntent, base: &'static str) -> Self {
    let mut params = ParameterSet::new();
    params.bind(METRIC_PARAM, intent.metric.label());
    Self { intent, base, filters: Vec::new(), params }
  }

  /// Apply `filter` with `value`.
  ///
  /// A filter contributes its clause once; binding it again only replaces
  /// the value.
  pub fn bind_filter(&mut self, filter: Filter, value: impl Into<ParamValue>) {
    if !self.filters.contains(&filter) {
      self.filters.push(filter);
    }
    self.params.bind(filter.placeholder(), value);
  }

  pub fn has_filter(&self, filter: Filter) -> bool { self.filters.contains(&filter) }

  pub fn filters(&self) -> &[Filter] { &self.filters }

  pub fn params(&self) -> &ParameterSet { &self.params }

  /// Render the final SQL text.
  pub fn sql(&self) -> String {
    let mut sql = self.base.trim_end().to_owned();
    for filter in &self.filters {
      sql.push_str("\n  ");
      sql.push_str(filter.clause());
    }
    sql
  }
}

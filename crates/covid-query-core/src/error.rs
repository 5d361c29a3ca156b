//! Error types for `covid-query-core`.

use thiserror::Error;

/// Why a query produced no answer.
#[derive(Debug, Error)]
pub enum QueryError {
  /// The extractor scored the text at or below the threshold, or failed
  /// (`score` is `None`).
  #[error("low confidence: {score:?}")]
  LowConfidence { score: Option<f32> },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The statement ran but produced nothing to show.
  #[error("empty result")]
  EmptyResult,
}

impl QueryError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    QueryError::Store(Box::new(e))
  }
}

pub type Result<T, E = QueryError> = std::result::Result<T, E>;

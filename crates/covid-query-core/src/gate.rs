//! Confidence gate: the single admission-control point of the pipeline.

use tracing::{debug, warn};

use crate::{
  error::{QueryError, Result},
  extract::EntityExtractor,
};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Rejects texts the extractor does not score strictly above `threshold`.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceGate {
  threshold: f32,
}

impl Default for ConfidenceGate {
  fn default() -> Self { Self::new(DEFAULT_CONFIDENCE_THRESHOLD) }
}

impl ConfidenceGate {
  pub fn new(threshold: f32) -> Self { Self { threshold } }

  pub fn threshold(&self) -> f32 { self.threshold }

  /// Score `text` and return the score if it is admitted.
  ///
  /// Extractor failures are logged and reported as a rejection with no
  /// score.
  pub fn admit<E>(&self, extractor: &E, text: &str) -> Result<f32>
  where
    E: EntityExtractor + ?Sized,
  {
    let score = match extractor.score(text) {
      Ok(score) => score,
      Err(e) => {
        warn!(model = extractor.model(), "confidence scoring failed: {e}");
        return Err(QueryError::LowConfidence { score: None });
      }
    };

    if score.is_nan() || score <= self.threshold {
      debug!(score, threshold = self.threshold, "query rejected");
      return Err(QueryError::LowConfidence { score: Some(score) });
    }
    Ok(score)
  }
}

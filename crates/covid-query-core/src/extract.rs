//! The `EntityExtractor` trait and the entity spans it produces.
//!
//! Extractors are black boxes to the pipeline: they score how confidently a
//! text is a statistics question and tag substrings with a semantic type.
//! Implementations live outside this crate (see `covid-query-nlp`).

use serde::Serialize;

/// Semantic type of an entity span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  Place,
  Date,
  Number,
}

/// A substring of the query tagged with an [`EntityKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySpan {
  pub kind:  EntityKind,
  /// The span text exactly as it appears in the analysed input.
  pub text:  String,
  /// Byte offset of the span start in the analysed input.
  pub start: usize,
}

impl EntitySpan {
  pub fn new(kind: EntityKind, text: impl Into<String>, start: usize) -> Self {
    Self { kind, text: text.into(), start }
  }
}

/// Failure reported by an extractor.
///
/// Carried as an opaque boxed error; the pipeline only logs it.
pub type ExtractError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A pluggable intent scorer and entity recogniser.
pub trait EntityExtractor: Send + Sync {
  /// Identifier of the underlying model, for logging.
  fn model(&self) -> &str;

  /// Confidence in `[0, 1]` that `text` is a question the pipeline can
  /// answer.
  fn score(&self, text: &str) -> Result<f32, ExtractError>;

  /// Entity spans found in `text`, in order of appearance.
  fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, ExtractError>;
}

impl<T: EntityExtractor + ?Sized> EntityExtractor for std::sync::Arc<T> {
  fn model(&self) -> &str { (**self).model() }

  fn score(&self, text: &str) -> Result<f32, ExtractError> { (**self).score(text) }

  fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, ExtractError> {
    (**self).extract(text)
  }
}

//! Error types for the lexicon extractor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown extractor model: {0:?}")]
  UnknownModel(String),

  #[error("empty query")]
  EmptyInput,

  #[error("query too long: {len} bytes (max {max})")]
  InputTooLong { len: usize, max: usize },

  #[error("pattern error: {0}")]
  Pattern(#[from] regex::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

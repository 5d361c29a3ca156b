//! Entity extraction and intent scoring for the COVID-19 query service.
//!
//! Implements [`covid_query_core::extract::EntityExtractor`] without any
//! model files. Pure synchronous; no database dependencies. The place
//! gazetteer is supplied by the caller, usually from the store's locations.
//!
//! # Quick start
//!
//! ```no_run
//! use covid_query_core::extract::EntityExtractor as _;
//!
//! let extractor = covid_query_nlp::load("lexicon-es", ["Guadalajara"]).unwrap();
//! let spans = extractor.extract("muertes en guadalajara").unwrap();
//! println!("{} spans, score {}", spans.len(), extractor.score("muertes").unwrap());
//! ```

pub mod error;
mod lexicon;

pub use error::{Error, Result};
pub use lexicon::{LexiconExtractor, MAX_INPUT_LEN};
use tracing::info;

/// Identifier of the lexicon model, as configured in `NLP.spacy_model`.
pub const LEXICON_MODEL: &str = "lexicon-es";

/// Load the extractor named `model` with `places` as its gazetteer.
///
/// Unknown model identifiers are an error; callers treat it as fatal.
pub fn load<I, S>(model: &str, places: I) -> Result<LexiconExtractor>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  if model != LEXICON_MODEL {
    return Err(Error::UnknownModel(model.to_owned()));
  }
  let extractor = LexiconExtractor::new(places)?;
  info!(model, places = extractor.places().len(), "extractor loaded");
  Ok(extractor)
}

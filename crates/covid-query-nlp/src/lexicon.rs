//! Lexicon extractor: a place gazetteer plus date and number patterns, with
//! a keyword-based confidence score.
//!
//! Pipeline:
//!   raw &str
//!     └─ to_lowercase()
//!          ├─ gazetteer scan      → Place spans (longest name first)
//!          ├─ "últimos N"         → Number spans, even when N looks like a year
//!          ├─ date pattern        → Date spans
//!          └─ number pattern      → Number spans (outside dates)
//!               └─ sort by offset → Vec<EntitySpan>

use std::ops::Range;

use covid_query_core::{
  bind::RECENT_MARKERS,
  extract::{EntityExtractor, EntityKind, EntitySpan, ExtractError},
  select,
};
use regex::Regex;
use tracing::trace;

use crate::{
  LEXICON_MODEL,
  error::{Error, Result},
};

/// Longest input accepted, in bytes.
pub const MAX_INPUT_LEN: usize = 1024;

// ─── Scoring weights ─────────────────────────────────────────────────────────

const BASE_SCORE: f32 = 0.4;
const VOCABULARY_WEIGHT: f32 = 0.35;
const QUESTION_WEIGHT: f32 = 0.35;
const ENTITY_WEIGHT: f32 = 0.15;

/// Domain words beyond the selector keywords.
const EXTRA_VOCABULARY: &[&str] = &[
  "caso", "covid", "contagi", "hospitaliz", "vacun", "case", "infect",
];

/// Phrases that mark a quantitative question.
const QUESTION_MARKERS: &[&str] = &[
  "cuánt", "cuant", "cuál", "cual", "número", "numero", "total", "suma",
  "how many", "how much", "number of",
];

// ─── Extractor ───────────────────────────────────────────────────────────────

/// Rule-based [`EntityExtractor`].
///
/// Spans are reported in lower case with offsets into the lower-cased input.
#[derive(Debug, Clone)]
pub struct LexiconExtractor {
  /// Lower-cased place names, longest first.
  places: Vec<String>,
  date:   Regex,
  number: Regex,
}

impl LexiconExtractor {
  pub fn new<I, S>(places: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut places: Vec<String> = places
      .into_iter()
      .map(|p| p.as_ref().trim().to_lowercase())
      .filter(|p| !p.is_empty())
      .collect();
    places.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    places.dedup();

    Ok(Self {
      places,
      date: Regex::new(r"\b(?:[0-9]{4}-[0-9]{2}(?:-[0-9]{2})?|(?:19|20)[0-9]{2})\b")?,
      number: Regex::new(r"\b[0-9]+(?:[.,][0-9]+)?\b")?,
    })
  }

  pub fn places(&self) -> &[String] { &self.places }

  fn check(text: &str) -> Result<()> {
    if text.trim().is_empty() {
      return Err(Error::EmptyInput);
    }
    if text.len() > MAX_INPUT_LEN {
      return Err(Error::InputTooLong { len: text.len(), max: MAX_INPUT_LEN });
    }
    Ok(())
  }

  /// Entity spans of `text`, ordered by offset.
  pub fn entities(&self, text: &str) -> Result<Vec<EntitySpan>> {
    Self::check(text)?;
    let lowered = text.to_lowercase();
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut spans = Vec::new();

    for place in &self.places {
      for (at, _) in lowered.match_indices(place.as_str()) {
        let range = at..at + place.len();
        if is_word(&lowered, &range) && !overlaps(&claimed, &range) {
          spans.push(EntitySpan::new(EntityKind::Place, place.as_str(), at));
          claimed.push(range);
        }
      }
    }

    // Day counts go before dates so "últimos 2000 días" is not a year.
    for m in self.number.find_iter(&lowered) {
      if follows_recent_marker(&lowered, m.start()) && !overlaps(&claimed, &m.range()) {
        spans.push(EntitySpan::new(EntityKind::Number, m.as_str(), m.start()));
        claimed.push(m.range());
      }
    }

    for m in self.date.find_iter(&lowered) {
      if !overlaps(&claimed, &m.range()) {
        spans.push(EntitySpan::new(EntityKind::Date, m.as_str(), m.start()));
        claimed.push(m.range());
      }
    }

    for m in self.number.find_iter(&lowered) {
      if !overlaps(&claimed, &m.range()) {
        spans.push(EntitySpan::new(EntityKind::Number, m.as_str(), m.start()));
        claimed.push(m.range());
      }
    }

    spans.sort_by_key(|s| s.start);
    trace!(?spans, "entities extracted");
    Ok(spans)
  }

  /// Confidence that `text` is a statistics question.
  pub fn confidence(&self, text: &str) -> Result<f32> {
    let entities = self.entities(text)?;
    let lowered = text.to_lowercase();

    let mut score = BASE_SCORE;
    if select::keywords()
      .chain(EXTRA_VOCABULARY.iter().copied())
      .any(|k| lowered.contains(k))
    {
      score += VOCABULARY_WEIGHT;
    }
    if QUESTION_MARKERS.iter().any(|m| lowered.contains(m)) {
      score += QUESTION_WEIGHT;
    }
    if !entities.is_empty() {
      score += ENTITY_WEIGHT;
    }
    Ok(score.min(1.0))
  }
}

impl EntityExtractor for LexiconExtractor {
  fn model(&self) -> &str { LEXICON_MODEL }

  fn score(&self, text: &str) -> Result<f32, ExtractError> {
    Ok(self.confidence(text)?)
  }

  fn extract(&self, text: &str) -> Result<Vec<EntitySpan>, ExtractError> {
    Ok(self.entities(text)?)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn overlaps(claimed: &[Range<usize>], range: &Range<usize>) -> bool {
  claimed.iter().any(|c| c.start < range.end && range.start < c.end)
}

/// The word right before `at` is a recent-marker ("últimos 30", "last 7").
fn follows_recent_marker(text: &str, at: usize) -> bool {
  text[..at]
    .split_whitespace()
    .next_back()
    .is_some_and(|word| RECENT_MARKERS.iter().any(|m| word.contains(m)))
}

/// `range` starts and ends on word boundaries of `text`.
fn is_word(text: &str, range: &Range<usize>) -> bool {
  let before = text[..range.start].chars().next_back();
  let after = text[range.end..].chars().next();
  !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

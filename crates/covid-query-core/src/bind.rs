//! Filter binding: turns extracted entity spans into optional WHERE
//! fragments on a [`QueryPlan`].
//!
//! Binding never fails: spans that cannot be used are skipped.

use tracing::debug;

use crate::{
  extract::{EntityKind, EntitySpan},
  plan::{Filter, QueryPlan},
};

/// Words that turn a numeric entity into a "last N days" window.
pub const RECENT_MARKERS: &[&str] = &[
  "último", "ultimo", "última", "ultima", "last", "recent",
];

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
///
/// `"ciudad de méxico"` becomes `"Ciudad De México"`.
pub fn title_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut at_word_start = true;
  for c in text.chars() {
    if c.is_alphabetic() {
      if at_word_start {
        out.extend(c.to_uppercase());
      } else {
        out.extend(c.to_lowercase());
      }
      at_word_start = false;
    } else {
      out.push(c);
      at_word_start = true;
    }
  }
  out
}

/// Apply one filter per usable entity in `entities` to `plan`.
///
/// `text` is the lower-cased query; it decides whether numbers are day
/// windows. Places and dates are last-wins; the first integer wins the day
/// window.
pub fn bind_filters(plan: &mut QueryPlan, entities: &[EntitySpan], text: &str) {
  let recent = RECENT_MARKERS.iter().any(|m| text.contains(m));

  for entity in entities {
    match entity.kind {
      EntityKind::Place => {
        plan.bind_filter(Filter::Location, title_case(entity.text.trim()));
      }
      EntityKind::Date => {
        plan.bind_filter(Filter::DatePattern, entity.text.trim());
      }
      EntityKind::Number if recent && !plan.has_filter(Filter::LastDays) => {
        match entity.text.trim().parse::<i64>() {
          Ok(days) => plan.bind_filter(Filter::LastDays, days),
          Err(_) => debug!(text = %entity.text, "skipping non-integer day count"),
        }
      }
      EntityKind::Number => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{plan::ParamValue, select::select};

  fn span(kind: EntityKind, text: &str) -> EntitySpan { EntitySpan::new(kind, text, 0) }

  #[test]
  fn title_case_handles_accents_and_separators() {
    assert_eq!(title_case("ciudad de méxico"), "Ciudad De México");
    assert_eq!(title_case("los ángeles"), "Los Ángeles");
    assert_eq!(title_case("NUEVA YORK"), "Nueva York");
    assert_eq!(title_case("o'brien-smith"), "O'Brien-Smith");
  }

  #[test]
  fn place_binds_title_cased_location() {
    let text = "casos en ciudad de méxico";
    let mut plan = select(text);
    bind_filters(&mut plan, &[span(EntityKind::Place, "ciudad de méxico")], text);

    assert_eq!(
      plan.params().get("ubicacion"),
      Some(&ParamValue::from("Ciudad De México"))
    );
    assert!(plan.sql().contains("ubicaciones.ciudad = :ubicacion"));
  }

  #[test]
  fn date_binds_raw_text_as_substring_pattern() {
    let text = "casos en 2023-01";
    let mut plan = select(text);
    bind_filters(&mut plan, &[span(EntityKind::Date, "2023-01")], text);

    assert_eq!(plan.params().get("fecha"), Some(&ParamValue::from("2023-01")));
    assert!(plan.sql().contains("fecha LIKE '%' || :fecha || '%'"));
  }

  #[test]
  fn number_without_recent_marker_is_ignored() {
    let text = "casos 30";
    let mut plan = select(text);
    bind_filters(&mut plan, &[span(EntityKind::Number, "30")], text);
    assert!(!plan.params().contains("dias"));
    assert!(!plan.sql().contains(":dias"));
  }

  #[test]
  fn number_with_recent_marker_binds_day_window() {
    let text = "casos de los últimos 30 días";
    let mut plan = select(text);
    bind_filters(&mut plan, &[span(EntityKind::Number, "30")], text);
    assert_eq!(plan.params().get("dias"), Some(&ParamValue::Integer(30)));
    assert!(plan.sql().contains("date('now', '-' || :dias || ' days')"));
  }

  #[test]
  fn first_number_wins_the_day_window() {
    let text = "muertes de los últimos 7 días en 2 ciudades";
    let mut plan = select(text);
    bind_filters(
      &mut plan,
      &[span(EntityKind::Number, "7"), span(EntityKind::Number, "2")],
      text,
    );
    assert_eq!(plan.params().get("dias"), Some(&ParamValue::Integer(7)));
  }

  #[test]
  fn non_integer_number_is_skipped() {
    let text = "casos de los últimos 1.5 días";
    let mut plan = select(text);
    bind_filters(&mut plan, &[span(EntityKind::Number, "1.5")], text);
    assert!(!plan.has_filter(Filter::LastDays));
  }

  #[test]
  fn repeated_places_keep_one_clause_and_last_value() {
    let text = "casos en guadalajara y nueva york";
    let mut plan = select(text);
    bind_filters(
      &mut plan,
      &[span(EntityKind::Place, "guadalajara"), span(EntityKind::Place, "nueva york")],
      text,
    );
    assert_eq!(plan.sql().matches(":ubicacion").count(), 1);
    assert_eq!(plan.params().get("ubicacion"), Some(&ParamValue::from("Nueva York")));
  }

  #[test]
  fn no_entities_leaves_metric_only() {
    let text = "camas disponibles";
    let mut plan = select(text);
    bind_filters(&mut plan, &[], text);
    assert_eq!(plan.params().len(), 1);
  }
}

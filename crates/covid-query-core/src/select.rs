//! Template selection: keyword rules that map query text to a domain
//! template, a metric and the per-domain category filters.
//!
//! Rules are evaluated top to bottom and the first match wins. Every input
//! resolves to a plan; the cases domain is the fallback.

use crate::{
  intent::{Domain, Metric, ParsedIntent},
  plan::{Filter, QueryPlan},
};

// ─── Rule tables ─────────────────────────────────────────────────────────────

/// `(keywords, domain)` in priority order. A brand name or a dose count
/// alone is enough to pick the vaccine domain.
pub const DOMAIN_RULES: &[(&[&str], Domain)] = &[
  (
    &["vacuna", "vaccin", "dosis", "dose", "pfizer", "moderna", "johnson", "astrazeneca"],
    Domain::Vaccine,
  ),
  (&["hospital", "cama", "bed"], Domain::Hospital),
  (&["prueba", "test"], Domain::Test),
];

/// `(keywords, metric)` in priority order; domains without a match fall back
/// to [`Domain::default_metric`].
pub const METRIC_RULES: &[(&[&str], Metric)] = &[
  (&["muerte", "fallec", "death"], Metric::Deaths),
  (&["activo", "active"], Metric::Active),
  (&["recuperado", "recovered"], Metric::Recovered),
  (&["disponible", "available"], Metric::BedsAvailable),
  (&["ocupada", "occupied"], Metric::BedsOccupied),
  (&["dosis", "dose"], Metric::DosesAdministered),
  (&["positiva", "positive"], Metric::TestsPositive),
];

/// Vaccine brands as stored in `vacunaciones.tipo_vacuna`.
pub const VACCINE_BRANDS: &[&str] = &["Pfizer", "Moderna", "Johnson", "AstraZeneca"];

/// `(keywords, label)` for `pruebas.tipo_prueba`.
pub const TEST_TYPES: &[(&[&str], &str)] = &[
  (&["pcr"], "PCR"),
  (&["antígeno", "antigeno"], "Antígenos"),
];

// ─── Templates ───────────────────────────────────────────────────────────────

const CASES_TEMPLATE: &str = "
SELECT
  CASE
    WHEN :metric = 'muertes' THEN SUM(muertes)
    WHEN :metric = 'activos' THEN SUM(casos_activos)
    WHEN :metric = 'recuperados' THEN SUM(casos_recuperados)
    ELSE SUM(casos_confirmados)
  END AS resultado
FROM casos_covid
JOIN ubicaciones ON casos_covid.ubicacion_id = ubicaciones.id
WHERE 1=1";

const HOSPITAL_TEMPLATE: &str = "
SELECT
  CASE
    WHEN :metric = 'disponibles' THEN SUM(camas_disponibles)
    WHEN :metric = 'ocupadas' THEN SUM(camas_ocupadas)
    ELSE SUM(camas_disponibles + camas_ocupadas)
  END AS resultado
FROM hospitalizaciones
JOIN ubicaciones ON hospitalizaciones.ubicacion_id = ubicaciones.id
WHERE 1=1";

const VACCINE_TEMPLATE: &str = "
SELECT
  CASE
    WHEN :metric = 'dosis' THEN SUM(dosis_administradas)
    ELSE SUM(personas_vacunadas)
  END AS resultado
FROM vacunaciones
JOIN ubicaciones ON vacunaciones.ubicacion_id = ubicaciones.id
WHERE 1=1";

const TEST_TEMPLATE: &str = "
SELECT
  CASE
    WHEN :metric = 'positivas' THEN SUM(pruebas_positivas)
    ELSE SUM(total_pruebas)
  END AS resultado
FROM pruebas
JOIN ubicaciones ON pruebas.ubicacion_id = ubicaciones.id
WHERE 1=1";

pub fn template(domain: Domain) -> &'static str {
  match domain {
    Domain::Cases => CASES_TEMPLATE,
    Domain::Hospital => HOSPITAL_TEMPLATE,
    Domain::Vaccine => VACCINE_TEMPLATE,
    Domain::Test => TEST_TEMPLATE,
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

fn contains_any(text: &str, keywords: &[&str]) -> bool {
  keywords.iter().any(|k| text.contains(k))
}

/// Pick the domain for lower-cased `text`.
pub fn select_domain(text: &str) -> Domain {
  DOMAIN_RULES
    .iter()
    .find(|(keywords, _)| contains_any(text, keywords))
    .map_or(Domain::Cases, |&(_, domain)| domain)
}

/// Pick the metric within `domain` for lower-cased `text`.
pub fn select_metric(domain: Domain, text: &str) -> Metric {
  METRIC_RULES
    .iter()
    .filter(|(_, metric)| metric.domain() == domain)
    .find(|(keywords, _)| contains_any(text, keywords))
    .map_or_else(|| domain.default_metric(), |&(_, metric)| metric)
}

/// Build the domain plan for lower-cased `text`, including the domain's
/// category filters.
pub fn select(text: &str) -> QueryPlan {
  let domain = select_domain(text);
  let intent = ParsedIntent { domain, metric: select_metric(domain, text) };
  let mut plan = QueryPlan::new(intent, template(domain));

  match domain {
    Domain::Vaccine => {
      if let Some(brand) = VACCINE_BRANDS
        .iter()
        .find(|brand| text.contains(&brand.to_lowercase()))
      {
        plan.bind_filter(Filter::VaccineType, *brand);
      }
    }
    Domain::Test => {
      if let Some((_, label)) =
        TEST_TYPES.iter().find(|(keywords, _)| contains_any(text, keywords))
      {
        plan.bind_filter(Filter::TestType, *label);
      }
    }
    Domain::Cases | Domain::Hospital => {}
  }

  plan
}

/// Every keyword the selector reacts to.
pub fn keywords() -> impl Iterator<Item = &'static str> {
  let domains = DOMAIN_RULES.iter().flat_map(|(k, _)| k.iter().copied());
  let metrics = METRIC_RULES.iter().flat_map(|(k, _)| k.iter().copied());
  let tests = TEST_TYPES.iter().flat_map(|(k, _)| k.iter().copied());
  domains.chain(metrics).chain(tests)
}

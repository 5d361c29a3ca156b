//! Parsed intent: which fact table a query targets and which metric it sums.
//!
//! An intent is derived once per query by the template selector and never
//! mutated afterwards.

use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// The fact table a query is answered from.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Domain {
  Cases,
  Hospital,
  Vaccine,
  Test,
}

impl Domain {
  /// Metric used when no metric keyword matches.
  pub fn default_metric(self) -> Metric {
    match self {
      Domain::Cases => Metric::Confirmed,
      Domain::Hospital => Metric::BedsTotal,
      Domain::Vaccine => Metric::PeopleVaccinated,
      Domain::Test => Metric::TestsTotal,
    }
  }
}

/// A metric variant within a domain.
///
/// The string form is the label bound to the `:metric` placeholder and matched
/// by the template's `CASE` expression. Labels are unique within a domain but
/// not across domains (`total` exists for both beds and tests).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
  #[strum(serialize = "confirmados")]
  Confirmed,
  #[strum(serialize = "muertes")]
  Deaths,
  #[strum(serialize = "activos")]
  Active,
  #[strum(serialize = "recuperados")]
  Recovered,

  #[strum(serialize = "disponibles")]
  BedsAvailable,
  #[strum(serialize = "ocupadas")]
  BedsOccupied,
  #[strum(serialize = "total")]
  BedsTotal,

  #[strum(serialize = "personas")]
  PeopleVaccinated,
  #[strum(serialize = "dosis")]
  DosesAdministered,

  #[strum(serialize = "positivas")]
  TestsPositive,
  #[strum(serialize = "total")]
  TestsTotal,
}

impl Metric {
  pub fn domain(self) -> Domain {
    match self {
      Metric::Confirmed | Metric::Deaths | Metric::Active | Metric::Recovered => {
        Domain::Cases
      }
      Metric::BedsAvailable | Metric::BedsOccupied | Metric::BedsTotal => {
        Domain::Hospital
      }
      Metric::PeopleVaccinated | Metric::DosesAdministered => Domain::Vaccine,
      Metric::TestsPositive | Metric::TestsTotal => Domain::Test,
    }
  }

  /// Label bound to `:metric`.
  pub fn label(self) -> &'static str { self.into() }
}

/// The outcome of template selection: a domain and one of its metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParsedIntent {
  pub domain: Domain,
  pub metric: Metric,
}

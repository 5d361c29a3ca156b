//! The query-interpretation pipeline.
//!
//! raw text → confidence gate → entity extraction → template selection →
//! filter binding → cache lookup → store execution → cache fill.
//!
//! [`Pipeline::answer`] is the boundary towards presentation shells: it never
//! fails and maps every error onto an [`Answer`].

use std::sync::Arc;

use tracing::{Instrument as _, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
  bind::bind_filters,
  cache::{CacheKey, Clock, QueryCache, SystemClock},
  error::{QueryError, Result},
  extract::EntityExtractor,
  format,
  gate::ConfidenceGate,
  plan::QueryPlan,
  select::select,
  store::{QueryStore, RowSet},
};

// ─── Answer ──────────────────────────────────────────────────────────────────

/// What a presentation shell shows for one query.
#[derive(Debug, Clone)]
pub enum Answer {
  Rows(Arc<RowSet>),
  NotUnderstood,
  Empty,
  Failed,
}

impl Answer {
  /// Machine-readable outcome name.
  pub fn status(&self) -> &'static str {
    match self {
      Answer::Rows(_) => "ok",
      Answer::NotUnderstood => "not_understood",
      Answer::Empty => "empty",
      Answer::Failed => "error",
    }
  }

  /// Text shown to the user.
  pub fn message(&self) -> String {
    match self {
      Answer::Rows(rows) => format::format_rows(rows),
      Answer::NotUnderstood => format::NOT_UNDERSTOOD.to_owned(),
      Answer::Empty => format::NO_RESULTS.to_owned(),
      Answer::Failed => format::PROCESSING_ERROR.to_owned(),
    }
  }

  pub fn rows(&self) -> Option<&RowSet> {
    match self {
      Answer::Rows(rows) => Some(rows),
      _ => None,
    }
  }
}

impl From<Result<Arc<RowSet>>> for Answer {
  fn from(result: Result<Arc<RowSet>>) -> Self {
    match result {
      Ok(rows) => Answer::Rows(rows),
      Err(QueryError::LowConfidence { .. }) => Answer::NotUnderstood,
      Err(QueryError::EmptyResult) => Answer::Empty,
      Err(QueryError::Store(_)) => Answer::Failed,
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

pub struct Pipeline<E, S, C: Clock = SystemClock> {
  extractor: E,
  store:     S,
  gate:      ConfidenceGate,
  cache:     QueryCache<C>,
}

impl<E, S> Pipeline<E, S>
where
  E: EntityExtractor,
  S: QueryStore,
{
  /// A pipeline with the default threshold and freshness window.
  pub fn new(extractor: E, store: S) -> Self {
    Self {
      extractor,
      store,
      gate: ConfidenceGate::default(),
      cache: QueryCache::default(),
    }
  }
}

impl<E, S, C> Pipeline<E, S, C>
where
  E: EntityExtractor,
  S: QueryStore,
  C: Clock,
{
  pub fn with_gate(mut self, gate: ConfidenceGate) -> Self {
    self.gate = gate;
    self
  }

  pub fn with_cache<C2: Clock>(self, cache: QueryCache<C2>) -> Pipeline<E, S, C2> {
    Pipeline { extractor: self.extractor, store: self.store, gate: self.gate, cache }
  }

  pub fn extractor(&self) -> &E { &self.extractor }

  pub fn store(&self) -> &S { &self.store }

  pub fn cache(&self) -> &QueryCache<C> { &self.cache }

  /// Turn `text` into a plan, or reject it.
  pub fn interpret(&self, text: &str) -> Result<QueryPlan> {
    let score = self.gate.admit(&self.extractor, text)?;

    let lowered = text.to_lowercase();
    let entities = self.extractor.extract(&lowered).map_err(|e| {
      warn!(model = self.extractor.model(), "entity extraction failed: {e}");
      QueryError::LowConfidence { score: None }
    })?;

    let mut plan = select(&lowered);
    bind_filters(&mut plan, &entities, &lowered);

    debug!(
      score,
      domain = %plan.intent.domain,
      metric = %plan.intent.metric,
      entities = entities.len(),
      params = ?plan.params(),
      "query interpreted"
    );
    Ok(plan)
  }

  /// Run `plan`, serving from the cache while fresh.
  pub async fn execute(&self, plan: &QueryPlan) -> Result<Arc<RowSet>> {
    let sql = plan.sql();
    let key = CacheKey::new(&sql, plan.params());

    let rows = match self.cache.get(&key) {
      Some(rows) => {
        debug!(fingerprint = %key.fingerprint(), "cache hit");
        rows
      }
      None => {
        let rows = self.store.execute(&sql, plan.params()).await.map_err(|e| {
          error!("error executing query: {e}");
          QueryError::store(e)
        })?;
        let rows = Arc::new(rows);
        self.cache.put(key, Arc::clone(&rows));
        rows
      }
    };

    if rows.is_empty() {
      return Err(QueryError::EmptyResult);
    }
    Ok(rows)
  }

  /// Interpret and execute `text`.
  pub async fn run(&self, text: &str) -> Result<Arc<RowSet>> {
    let plan = self.interpret(text)?;
    self.execute(&plan).await
  }

  /// Interpret and execute `text`, mapping every outcome onto an [`Answer`].
  pub async fn answer(&self, text: &str) -> Answer {
    let span = info_span!("query", id = %Uuid::new_v4());
    async {
      let answer = Answer::from(self.run(text).await);
      info!(status = answer.status(), "query answered");
      answer
    }
    .instrument(span)
    .await
  }
}

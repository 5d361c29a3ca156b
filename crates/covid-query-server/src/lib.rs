//! HTTP and startup layer for the COVID-19 statistics query service.
//!
//! Exposes an axum [`Router`] over a shared [`Pipeline`], plus the
//! configuration types the `covid-query` binary is driven by.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/query` | Body: `{"query": "..."}`; returns [`QueryResponse`] |
//! | `GET`  | `/health` | Liveness check |

pub mod config;
pub mod error;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::State,
  routing::{get, post},
};
use covid_query_core::{
  Answer, Pipeline, extract::EntityExtractor, format, store::QueryStore, store::RowSet,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<E, S> {
  pub pipeline: Arc<Pipeline<E, S>>,
}

impl<E, S> Clone for AppState<E, S> {
  fn clone(&self) -> Self { Self { pipeline: Arc::clone(&self.pipeline) } }
}

impl<E, S> AppState<E, S> {
  pub fn new(pipeline: Pipeline<E, S>) -> Self { Self { pipeline: Arc::new(pipeline) } }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the service router. Every request is traced.
pub fn router<E, S>(state: AppState<E, S>) -> Router
where
  E: EntityExtractor + 'static,
  S: QueryStore + 'static,
{
  Router::new()
    .route("/query", post(query::<E, S>))
    .route("/health", get(health))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QueryBody {
  pub query: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
  /// `ok`, `not_understood`, `error` or `empty`.
  pub status:  &'static str,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rows:    Option<RowSet>,
}

impl From<Answer> for QueryResponse {
  fn from(answer: Answer) -> Self {
    Self {
      status:  answer.status(),
      message: answer.message(),
      rows:    answer.rows().cloned(),
    }
  }
}

/// `POST /query`
async fn query<E, S>(
  State(state): State<AppState<E, S>>,
  Json(body): Json<QueryBody>,
) -> Result<Json<QueryResponse>, ApiError>
where
  E: EntityExtractor + 'static,
  S: QueryStore + 'static,
{
  let text = body.query.trim();
  if text.is_empty() {
    return Err(ApiError::BadRequest(format::EMPTY_INPUT.to_owned()));
  }
  let answer = state.pipeline.answer(text).await;
  Ok(Json(answer.into()))
}

/// `GET /health`
async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use covid_query_core::plan::ParamValue;
  use covid_query_nlp::LexiconExtractor;
  use covid_query_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;

  async fn make_state() -> AppState<LexiconExtractor, SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.seed().await.unwrap();
    let cities = store.cities().await.unwrap();
    let extractor = covid_query_nlp::load(covid_query_nlp::LEXICON_MODEL, cities).unwrap();
    AppState::new(Pipeline::new(extractor, store))
  }

  async fn post_query(
    state: AppState<LexiconExtractor, SqliteStore>,
    body: &str,
  ) -> (StatusCode, Value) {
    let req = Request::builder()
      .method("POST")
      .uri("/query")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_owned()))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  fn ask(query: &str) -> String { serde_json::json!({ "query": query }).to_string() }

  // ── Health ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_returns_ok() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = router(make_state().await).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn vaccinated_with_pfizer_in_mexico_city() {
    let (status, body) = post_query(
      make_state().await,
      &ask("¿Cuántas personas fueron vacunadas con Pfizer en Ciudad de México?"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rows"]["columns"][0], "resultado");
    assert_eq!(body["rows"]["rows"][0][0], 1000);
    assert_eq!(body["message"], "Resultados de la consulta:\n\nresultado: 1000\n");
  }

  #[tokio::test]
  async fn available_beds() {
    let (_, body) = post_query(make_state().await, &ask("¿Cuántas camas disponibles hay?")).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rows"]["rows"][0][0], 390);
  }

  #[tokio::test]
  async fn brand_without_vaccine_word_reads_doses() {
    let (_, body) = post_query(
      make_state().await,
      &ask("¿Cuántas dosis de Moderna se aplicaron en 2023-02?"),
    )
    .await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["rows"]["rows"][0][0], 1200);
  }

  #[tokio::test]
  async fn year_like_day_window_is_not_a_date() {
    let state = make_state().await;
    let plan = state
      .pipeline
      .interpret("¿Cuántos casos hubo en los últimos 2000 días?")
      .unwrap();
    assert_eq!(plan.params().get("dias"), Some(&ParamValue::Integer(2000)));
    assert!(!plan.params().contains("fecha"));
  }

  #[tokio::test]
  async fn small_talk_is_not_understood() {
    let (status, body) = post_query(make_state().await, &ask("hola")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "not_understood");
    assert_eq!(body["message"], format::NOT_UNDERSTOOD);
    assert!(body.get("rows").is_none());
  }

  #[tokio::test]
  async fn unknown_period_is_empty() {
    let (_, body) = post_query(
      make_state().await,
      &ask("¿Cuántas muertes hubo en Guadalajara en 2019-05?"),
    )
    .await;
    assert_eq!(body["status"], "empty");
    assert_eq!(body["message"], format::NO_RESULTS);
  }

  #[tokio::test]
  async fn repeated_queries_are_served_from_cache() {
    let state = make_state().await;
    let q = ask("¿Cuántas camas disponibles hay?");
    post_query(state.clone(), &q).await;
    let (_, body) = post_query(state.clone(), &q).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(state.pipeline.cache().len(), 1);
  }

  // ── Rejections ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn blank_query_is_a_bad_request() {
    let (status, body) = post_query(make_state().await, &ask("   ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format::EMPTY_INPUT);
  }

  #[tokio::test]
  async fn missing_body_field_is_rejected() {
    let req = Request::builder()
      .method("POST")
      .uri("/query")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"text": "camas"}"#))
      .unwrap();
    let resp = router(make_state().await).oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
  }
}

//! Integration tests for `SqliteStore` against an in-memory database.

use covid_query_core::{
  bind::bind_filters,
  extract::{EntityKind, EntitySpan},
  plan::{ParamValue, ParameterSet},
  select::select,
  store::{QueryStore, Value},
};

use crate::{Error, PoolOptions, SqliteStore, Target};

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  assert!(s.seed().await.unwrap());
  s
}

/// Select + bind `text` with `entities`, run it and return the scalar.
async fn sum(s: &SqliteStore, text: &str, entities: &[EntitySpan]) -> Value {
  let mut plan = select(text);
  bind_filters(&mut plan, entities, text);
  let rows = s.execute(&plan.sql(), plan.params()).await.unwrap();
  assert_eq!(rows.columns, ["resultado"]);
  rows.scalar().cloned().unwrap()
}

fn place(text: &str) -> EntitySpan { EntitySpan::new(EntityKind::Place, text, 0) }

fn date(text: &str) -> EntitySpan { EntitySpan::new(EntityKind::Date, text, 0) }

// ─── Seeding ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn seed_runs_once() {
  let s = store().await;
  assert!(!s.seed().await.unwrap());
  assert_eq!(
    s.cities().await.unwrap(),
    ["Ciudad de México", "Guadalajara", "Nueva York", "Los Ángeles"]
  );
}

#[tokio::test]
async fn fresh_store_is_empty() {
  let s = SqliteStore::open_in_memory().await.unwrap();
  assert!(s.cities().await.unwrap().is_empty());
}

#[tokio::test]
async fn fact_rows_must_reference_a_location() {
  let s = store().await;
  let conn = s.pool().get().await.unwrap();
  let result = conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO hospitalizaciones (ubicacion_id, fecha, camas_disponibles, camas_ocupadas)
         VALUES (99, '2023-03-01', 1, 1)",
        [],
      )?;
      Ok(())
    })
    .await;
  assert!(result.is_err());
}

// ─── Domain templates ────────────────────────────────────────────────────────

#[tokio::test]
async fn beds_available_across_all_locations() {
  let s = store().await;
  assert_eq!(sum(&s, "camas disponibles", &[]).await, Value::Integer(390));
}

#[tokio::test]
async fn beds_total_adds_both_columns() {
  let s = store().await;
  assert_eq!(sum(&s, "camas en hospitales", &[]).await, Value::Integer(390 + 185));
}

#[tokio::test]
async fn pfizer_in_mexico_city() {
  let s = store().await;
  let text = "¿cuántas personas fueron vacunadas con pfizer en ciudad de méxico?";
  assert_eq!(sum(&s, text, &[place("ciudad de méxico")]).await, Value::Integer(1000));
}

#[tokio::test]
async fn doses_of_all_brands() {
  let s = store().await;
  assert_eq!(sum(&s, "dosis de vacunas", &[]).await, Value::Integer(6400));
}

#[tokio::test]
async fn brand_alone_reads_vaccination_rows() {
  let s = store().await;
  let text = "¿cuántas dosis de moderna se aplicaron en 2023-02?";
  assert_eq!(sum(&s, text, &[date("2023-02")]).await, Value::Integer(1200));
}

#[tokio::test]
async fn default_domain_sums_confirmed_cases() {
  let s = store().await;
  assert_eq!(sum(&s, "cuántos hay", &[]).await, Value::Integer(1050));
}

#[tokio::test]
async fn deaths_in_one_city() {
  let s = store().await;
  let v = sum(&s, "muertes en guadalajara", &[place("guadalajara")]).await;
  assert_eq!(v, Value::Integer(8));
}

#[tokio::test]
async fn location_match_ignores_case() {
  let s = store().await;
  let v = sum(&s, "casos activos en los ángeles", &[place("los ángeles")]).await;
  assert_eq!(v, Value::Integer(220));
}

#[tokio::test]
async fn date_filter_is_a_substring_match() {
  let s = store().await;
  let v = sum(&s, "casos recuperados en 2023-02", &[date("2023-02")]).await;
  assert_eq!(v, Value::Integer(95 + 165));
}

#[tokio::test]
async fn positive_pcr_tests() {
  let s = store().await;
  assert_eq!(sum(&s, "pruebas pcr positivas", &[]).await, Value::Integer(270));
}

#[tokio::test]
async fn antigen_tests_total() {
  let s = store().await;
  assert_eq!(sum(&s, "pruebas de antígeno", &[]).await, Value::Integer(1150));
}

#[tokio::test]
async fn unknown_city_yields_null_aggregate() {
  let s = store().await;
  let mut plan = select("casos en lima");
  bind_filters(&mut plan, &[place("lima")], "casos en lima");
  let rows = s.execute(&plan.sql(), plan.params()).await.unwrap();
  assert_eq!(rows.scalar(), Some(&Value::Null));
  assert!(rows.is_empty());
}

#[tokio::test]
async fn recent_window_excludes_old_rows() {
  let s = store().await;
  let text = "muertes de los últimos 30 días";
  let v = sum(&s, text, &[EntitySpan::new(EntityKind::Number, "30", 0)]).await;
  assert_eq!(v, Value::Null);
}

#[tokio::test]
async fn wide_recent_window_reaches_past_rows() {
  let s = store().await;
  let text = "muertes de los últimos 100000 días";
  let v = sum(&s, text, &[EntitySpan::new(EntityKind::Number, "100000", 0)]).await;
  assert_eq!(v, Value::Integer(5 + 8 + 10 + 15));
}

// ─── Binding safety ──────────────────────────────────────────────────────────

#[tokio::test]
async fn injected_text_is_treated_as_a_value() {
  let s = store().await;
  let v = sum(&s, "casos", &[place("x' or '1'='1")]).await;
  assert_eq!(v, Value::Null);
  assert_eq!(s.cities().await.unwrap().len(), 4);
}

#[tokio::test]
async fn parameter_missing_from_statement_is_an_error() {
  let s = store().await;
  let mut params = ParameterSet::new();
  params.bind("ciudad", ParamValue::from("Guadalajara"));
  let err = s.execute("SELECT COUNT(*) FROM ubicaciones", &params).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn malformed_sql_is_an_error() {
  let s = store().await;
  let err = s.execute("SELEC nonsense", &ParameterSet::new()).await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));
}

#[tokio::test]
async fn writes_are_refused() {
  let s = store().await;
  let result = s.execute("DELETE FROM pruebas", &ParameterSet::new()).await;
  assert!(result.is_err());

  let rows = s
    .execute("SELECT COUNT(*) AS n FROM pruebas", &ParameterSet::new())
    .await
    .unwrap();
  assert_eq!(rows.scalar(), Some(&Value::Integer(4)));
}

#[tokio::test]
async fn multi_row_results_keep_column_names() {
  let s = store().await;
  let rows = s
    .execute(
      "SELECT ciudad, pais FROM ubicaciones WHERE pais = :pais ORDER BY id",
      &{
        let mut p = ParameterSet::new();
        p.bind("pais", "México");
        p
      },
    )
    .await
    .unwrap();
  assert_eq!(rows.columns, ["ciudad", "pais"]);
  assert_eq!(rows.len(), 2);
  assert_eq!(rows.rows[1][0], Value::Text("Guadalajara".into()));
}

// ─── Pooling ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn exhausted_pool_fails_execution() {
  let s = SqliteStore::open_target(
    Target::memory(),
    PoolOptions {
      pool_size:    1,
      max_overflow: 0,
      timeout:      std::time::Duration::from_millis(50),
    },
  )
  .await
  .unwrap();

  let held = s.pool().get().await.unwrap();
  let err = s.execute("SELECT 1", &ParameterSet::new()).await.unwrap_err();
  assert!(matches!(err, Error::PoolExhausted(_)));

  drop(held);
  assert!(s.execute("SELECT 1", &ParameterSet::new()).await.is_ok());
}

#[tokio::test]
async fn file_store_persists_between_opens() {
  let dir = std::env::temp_dir().join(format!("covid-query-{}", uuid::Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let url = format!("sqlite:///{}", dir.join("health_data.db").display());

  let first = SqliteStore::open(&url, PoolOptions::default()).await.unwrap();
  assert!(first.seed().await.unwrap());
  drop(first);

  let second = SqliteStore::open(&url, PoolOptions::default()).await.unwrap();
  assert!(!second.seed().await.unwrap());
  assert_eq!(second.cities().await.unwrap().len(), 4);

  drop(second);
  std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn unsupported_backend_is_rejected() {
  let err = SqliteStore::open("mysql://localhost/covid", PoolOptions::default())
    .await
    .err()
    .unwrap();
  assert!(matches!(err, Error::UnsupportedBackend(_)));
}

//! Application configuration.
//!
//! Read from an INI file (default `config.ini`) with environment overrides
//! of the form `COVID_QUERY_<SECTION>__<KEY>`, e.g.
//! `COVID_QUERY_SERVER__PORT=9000`. Section names and keys are
//! case-insensitive. Every key is optional.

use std::{
  fs, io,
  path::{Path, PathBuf},
  time::Duration,
};

use chrono::TimeDelta;
use config::{Config, Environment, File, FileFormat};
use covid_query_store_sqlite::PoolOptions;
use serde::Deserialize;
use thiserror::Error;

/// Written out when the configuration file does not exist.
pub const DEFAULT_CONFIG: &str = "\
[DATABASE]
connection_string = sqlite:///health_data.db
pool_size = 5
max_overflow = 10
pool_timeout = 30

[NLP]
spacy_model = lexicon-es
confidence_threshold = 0.7

[CACHE]
ttl_seconds = 300

[LOGGING]
level = info
file = covid_query_app.log

[SERVER]
host = 127.0.0.1
port = 8080
";

const ENV_PREFIX: &str = "COVID_QUERY";

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot access {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error(transparent)]
  Config(#[from] config::ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Sections ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub database: DatabaseConfig,
  pub nlp:      NlpConfig,
  pub cache:    CacheConfig,
  pub logging:  LoggingConfig,
  pub server:   ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
  pub connection_string: String,
  pub pool_size:         usize,
  pub max_overflow:      usize,
  /// Seconds to wait for a free connection.
  pub pool_timeout:      u64,
}

impl Default for DatabaseConfig {
  fn default() -> Self {
    Self {
      connection_string: "sqlite:///health_data.db".to_owned(),
      pool_size:         5,
      max_overflow:      10,
      pool_timeout:      30,
    }
  }
}

impl DatabaseConfig {
  pub fn pool_options(&self) -> PoolOptions {
    PoolOptions {
      pool_size:    self.pool_size.max(1),
      max_overflow: self.max_overflow,
      timeout:      Duration::from_secs(self.pool_timeout),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NlpConfig {
  #[serde(alias = "model")]
  pub spacy_model:          String,
  pub confidence_threshold: f32,
}

impl Default for NlpConfig {
  fn default() -> Self {
    Self {
      spacy_model:          covid_query_nlp::LEXICON_MODEL.to_owned(),
      confidence_threshold: covid_query_core::gate::DEFAULT_CONFIDENCE_THRESHOLD,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub ttl_seconds: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { ttl_seconds: covid_query_core::cache::DEFAULT_FRESHNESS_SECS }
  }
}

impl CacheConfig {
  pub fn freshness(&self) -> TimeDelta { TimeDelta::seconds(self.ttl_seconds.max(0)) }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  pub level: String,
  /// Log file, appended to. Empty logs to stderr.
  pub file:  String,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self { level: "info".to_owned(), file: "covid_query_app.log".to_owned() }
  }
}

impl LoggingConfig {
  pub fn file(&self) -> Option<&Path> {
    let file = self.file.trim();
    (!file.is_empty()).then(|| Path::new(file))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
}

impl Default for ServerConfig {
  fn default() -> Self { Self { host: "127.0.0.1".to_owned(), port: 8080 } }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

/// Write [`DEFAULT_CONFIG`] to `path` unless it exists.
///
/// Returns `true` if the file was created.
pub fn ensure_exists(path: &Path) -> Result<bool> {
  if path.exists() {
    return Ok(false);
  }
  fs::write(path, DEFAULT_CONFIG)
    .map_err(|source| Error::Io { path: path.to_owned(), source })?;
  Ok(true)
}

/// Read the INI file at `path` and apply environment overrides.
pub fn load(path: &Path) -> Result<AppConfig> {
  let text =
    fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_owned(), source })?;
  from_ini(&text)
}

/// Parse INI `text` and apply environment overrides.
pub fn from_ini(text: &str) -> Result<AppConfig> {
  let settings = Config::builder()
    .add_source(File::from_str(&normalize(text), FileFormat::Ini))
    .add_source(
      Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()?;
  Ok(settings.try_deserialize()?)
}

/// Lower-case section headers and keys; values are left alone.
fn normalize(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for line in text.lines() {
    let trimmed = line.trim_start();
    if trimmed.starts_with('[') {
      out.push_str(&trimmed.to_lowercase());
    } else if trimmed.starts_with(['#', ';']) {
      out.push_str(line);
    } else if let Some((key, value)) = line.split_once('=') {
      out.push_str(&key.trim().to_lowercase());
      out.push_str(" =");
      out.push_str(value);
    } else {
      out.push_str(line);
    }
    out.push('\n');
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_file_matches_default_values() {
    assert_eq!(from_ini(DEFAULT_CONFIG).unwrap(), AppConfig::default());
  }

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = from_ini("").unwrap();
    assert_eq!(cfg.database.connection_string, "sqlite:///health_data.db");
    assert_eq!(cfg.nlp.confidence_threshold, 0.7);
    assert_eq!(cfg.server.address(), "127.0.0.1:8080");
  }

  #[test]
  fn sections_and_keys_ignore_case() {
    let cfg = from_ini(
      "[database]\nPool_Size = 2\n\n[Cache]\nTTL_SECONDS = 60\n\n[nlp]\nmodel = lexicon-es\n",
    )
    .unwrap();
    assert_eq!(cfg.database.pool_size, 2);
    assert_eq!(cfg.database.max_overflow, 10);
    assert_eq!(cfg.cache.freshness(), TimeDelta::seconds(60));
    assert_eq!(cfg.nlp.spacy_model, "lexicon-es");
  }

  #[test]
  fn pool_size_is_at_least_one() {
    let cfg = from_ini("[DATABASE]\npool_size = 0\npool_timeout = 2\n").unwrap();
    let options = cfg.database.pool_options();
    assert_eq!(options.pool_size, 1);
    assert_eq!(options.timeout, Duration::from_secs(2));
  }

  #[test]
  fn blank_log_file_means_stderr() {
    let cfg = from_ini("[LOGGING]\nfile =\n").unwrap();
    assert_eq!(cfg.logging.file(), None);
    assert_eq!(
      AppConfig::default().logging.file(),
      Some(Path::new("covid_query_app.log"))
    );
  }

  #[test]
  fn malformed_numbers_are_rejected() {
    assert!(from_ini("[DATABASE]\npool_size = many\n").is_err());
  }

  #[test]
  fn missing_file_is_created_with_defaults() {
    let dir = std::env::temp_dir().join(format!("covid-query-cfg-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.ini");

    assert!(ensure_exists(&path).unwrap());
    assert!(!ensure_exists(&path).unwrap());
    assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    assert_eq!(load(&path).unwrap(), AppConfig::default());

    fs::remove_dir_all(&dir).ok();
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let err = load(Path::new("/nonexistent/covid-query/config.ini")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }
}

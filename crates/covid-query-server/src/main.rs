//! `covid-query` binary.
//!
//! Reads `config.ini` (or the path given with `--config`, written out with
//! defaults when missing), opens the SQLite store and answers questions from
//! the command line, from stdin or over HTTP.
//!
//! ```text
//! covid-query init-db
//! covid-query ask "¿Cuántas camas disponibles hay?"
//! covid-query serve --port 9000
//! ```

use std::{
  fs::OpenOptions,
  io::Write as _,
  path::PathBuf,
  process::ExitCode,
  sync::Mutex,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use covid_query_core::{Pipeline, cache::QueryCache, format, gate::ConfidenceGate};
use covid_query_nlp::LexiconExtractor;
use covid_query_server::{
  AppState,
  config::{self, AppConfig, LoggingConfig},
};
use covid_query_store_sqlite::SqliteStore;
use tokio::{
  io::{AsyncBufReadExt as _, BufReader},
  net::TcpListener,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const STARTUP_FAILED: &str =
  "La aplicación no pudo iniciarse. Revise los registros para más detalles.";

/// REPL lines that end the session.
const EXIT_WORDS: &[&str] = &["salir", "exit", "quit"];

type SqlitePipeline = Pipeline<LexiconExtractor, SqliteStore>;

#[derive(Parser)]
#[command(author, version, about = "Answer COVID-19 statistics questions asked in Spanish")]
struct Cli {
  /// Path to the INI configuration file.
  #[arg(short, long, global = true, default_value = "config.ini")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Answer one question and exit.
  Ask {
    #[arg(required = true)]
    query: Vec<String>,
  },
  /// Answer questions read from stdin, one per line.
  Repl,
  /// Serve the JSON API.
  Serve {
    /// Overrides `SERVER.host`.
    #[arg(long)]
    host: Option<String>,
    /// Overrides `SERVER.port`.
    #[arg(long)]
    port: Option<u16>,
  },
  /// Create the schema and insert the seed dataset if the store is empty.
  InitDb,
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      // Config errors happen before the configured subscriber exists.
      let _ = tracing_subscriber::fmt().with_writer(std::io::stderr).try_init();
      error!("{e:#}");
      eprintln!("{STARTUP_FAILED}");
      ExitCode::FAILURE
    }
  }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
  let created = config::ensure_exists(&cli.config)
    .context("failed to write the default configuration")?;
  let cfg = config::load(&cli.config)
    .with_context(|| format!("failed to load {}", cli.config.display()))?;
  init_tracing(&cfg.logging)?;
  if created {
    info!(path = %cli.config.display(), "wrote default configuration");
  }

  match cli.command {
    Command::Ask { query } => {
      let pipeline = open_pipeline(&cfg).await?;
      let text = query.join(" ");
      if text.trim().is_empty() {
        println!("{}", format::EMPTY_INPUT);
      } else {
        println!("{}", pipeline.answer(text.trim()).await.message());
      }
    }
    Command::Repl => {
      let pipeline = open_pipeline(&cfg).await?;
      repl(&pipeline).await?;
    }
    Command::Serve { host, port } => {
      let mut server = cfg.server.clone();
      server.host = host.unwrap_or(server.host);
      server.port = port.unwrap_or(server.port);

      let app = covid_query_server::router(AppState::new(open_pipeline(&cfg).await?));
      let address = server.address();
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      info!("Listening on http://{address}");
      axum::serve(listener, app).await.context("server error")?;
    }
    Command::InitDb => {
      let store = open_store(&cfg).await?;
      if store.seed().await.context("failed to insert the seed dataset")? {
        println!("Base de datos creada y datos insertados correctamente.");
      } else {
        println!("La base de datos ya contiene datos; no se insertó nada.");
      }
    }
  }
  Ok(())
}

// ─── Startup ─────────────────────────────────────────────────────────────────

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
  let level = logging.level.trim().to_lowercase();
  let filter = EnvFilter::builder()
    .with_default_directive(
      level.parse().with_context(|| format!("invalid log level {:?}", logging.level))?,
    )
    .from_env_lossy();
  let builder = tracing_subscriber::fmt().with_env_filter(filter);

  let installed = match logging.file() {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
      builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
    }
    None => builder.with_writer(std::io::stderr).try_init(),
  };
  installed.map_err(|e| anyhow::anyhow!(e))
}

async fn open_store(cfg: &AppConfig) -> anyhow::Result<SqliteStore> {
  let db = &cfg.database;
  SqliteStore::open(&db.connection_string, db.pool_options())
    .await
    .with_context(|| format!("failed to open store {:?}", db.connection_string))
}

async fn open_pipeline(cfg: &AppConfig) -> anyhow::Result<SqlitePipeline> {
  let store = open_store(cfg).await?;
  let cities = store.cities().await.context("failed to read locations")?;
  let extractor = covid_query_nlp::load(&cfg.nlp.spacy_model, cities)
    .with_context(|| format!("failed to load model {:?}", cfg.nlp.spacy_model))?;

  Ok(
    Pipeline::new(extractor, store)
      .with_gate(ConfidenceGate::new(cfg.nlp.confidence_threshold))
      .with_cache(QueryCache::new(cfg.cache.freshness())),
  )
}

// ─── REPL ────────────────────────────────────────────────────────────────────

async fn repl(pipeline: &SqlitePipeline) -> anyhow::Result<()> {
  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    print!("Consulta: ");
    std::io::stdout().flush()?;

    let Some(line) = lines.next_line().await? else {
      println!();
      return Ok(());
    };
    let text = line.trim();
    if EXIT_WORDS.contains(&text.to_lowercase().as_str()) {
      return Ok(());
    }
    if text.is_empty() {
      println!("{}", format::EMPTY_INPUT);
      continue;
    }
    println!("{}", pipeline.answer(text).await.message());
  }
}

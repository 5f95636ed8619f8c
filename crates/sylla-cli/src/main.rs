//! `sylla` — interactive console for the Sylla syllabus store.
//!
//! # Usage
//!
//! ```
//! sylla                          # opens ./sylla.db
//! sylla --store /path/to/db
//! sylla --config sylla.toml     # store_path = "..."
//! sylla --hash-password          # print an argon2 PHC string and exit
//! ```
//!
//! On first run the store is seeded with four accounts (two instructors, a
//! head of department, an admin), all with the password `changeme`.

mod channels;
mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use sylla_core::{
  accounts, notify::Dispatcher, repo::Repository, service::SyllabusService,
};
use sylla_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "sylla", about = "Version-controlled syllabus manager")]
struct Cli {
  /// Path to a TOML configuration file.
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Path to the SQLite store; overrides the config file.
  #[arg(long, env = "SYLLA_STORE")]
  store: Option<PathBuf>,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct AppConfig {
  store_path: PathBuf,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self { store_path: PathBuf::from("sylla.db") }
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = commands::prompt("Password: ")?;
    println!("{}", accounts::hash_password(&password)?);
    return Ok(());
  }

  // Load configuration: file first, environment overrides.
  let mut builder = config::Config::builder();
  if let Some(path) = &cli.config {
    builder = builder.add_source(config::File::from(path.clone()));
  }
  let settings = builder
    .add_source(config::Environment::with_prefix("SYLLA"))
    .build()
    .context("failed to read configuration")?;

  let app_cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise configuration")?;

  let store_path = cli.store.unwrap_or(app_cfg.store_path);

  // Open the store and load state; seeds default users on first run.
  let store = SqliteStore::open(&store_path)
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let repo = Repository::open(store).context("failed to load store state")?;

  let mut dispatcher = Dispatcher::new();
  dispatcher.add_channel(Box::new(channels::EmailChannel));
  dispatcher.add_channel(Box::new(channels::SmsChannel));

  let mut service = SyllabusService::new(repo, dispatcher);

  tracing::info!(store = %store_path.display(), "store opened");
  commands::run(&mut service)
}

//! `habitly` server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and serves the JSON API over HTTP.
//!
//! # Creating accounts
//!
//! ```text
//! habitly add-user --email ada@example.com --name Ada
//! ```
//!
//! The password is read from stdin.

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use habitly_api::AppState;
use habitly_core::{
  account::NewAccount,
  notify::{LogNotifier, Notification, dispatch_detached},
  store::{HabitStore, StoreError as _},
};
use habitly_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Habitly habit tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create an account. The password is read from stdin.
  AddUser {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name:  String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg, store).await,
    Command::AddUser { email, name } => add_user(cfg, store, email, name).await,
  }
}

async fn serve(cfg: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let app = habitly_api::router(AppState::new(Arc::new(store)));
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn add_user(
  cfg: ServerConfig,
  store: SqliteStore,
  email: String,
  name: String,
) -> anyhow::Result<()> {
  let password = read_password()?;
  if password.is_empty() {
    anyhow::bail!("password must not be empty");
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();

  let account = match store
    .create_account(NewAccount { email, name, password_hash })
    .await
  {
    Ok(a) => a,
    Err(e) if e.is_conflict() => anyhow::bail!("{e}"),
    Err(e) => return Err(e).context("failed to create account"),
  };
  tracing::info!(account_id = %account.id, email = %account.email, "account created");

  // Keep the process alive until the send attempt is over.
  dispatch_detached(
    Arc::new(LogNotifier),
    Notification::Welcome {
      email:         account.email.clone(),
      user_name:     account.name.clone(),
      dashboard_url: cfg.dashboard_url,
    },
  )
  .await
  .ok();

  println!("{}", account.id);
  Ok(())
}

/// Read one line from stdin as the password.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

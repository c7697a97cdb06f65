//! `magisterctl`: account administration against the Magister store.
//!
//! # Usage
//!
//! ```text
//! magisterctl register --login alice --email alice@example.org
//! magisterctl activate --login alice
//! magisterctl passwd   --login alice
//! magisterctl delete   --login alice
//! ```
//!
//! Commands that need a password read it from `--password`, or from stdin
//! when the flag is omitted.

use std::{io, path::PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use magister_core::store::UserStore;
use magister_store_sqlite::{SqliteStore, expand_tilde};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "magisterctl", about = "Manage Magister user accounts")]
struct Args {
  /// Path to the server's TOML config file; only `store_path` is read.
  #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
  config: PathBuf,

  /// Use this database instead of the configured one.
  #[arg(long, value_name = "FILE")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
  /// Create a user. New users are active unless `--inactive` is given.
  Register {
    #[arg(long)]
    login:    String,
    #[arg(long)]
    email:    String,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    inactive: bool,
  },
  /// Delete a user and revoke all of their sessions.
  Delete {
    #[arg(long)]
    login: String,
  },
  /// Allow an inactive user to log in.
  Activate {
    #[arg(long)]
    login: String,
  },
  /// Set a new password.
  Passwd {
    #[arg(long)]
    login:    String,
    #[arg(long)]
    password: Option<String>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(default)]
struct CtlConfig {
  store_path: PathBuf,
}

impl Default for CtlConfig {
  fn default() -> Self { Self { store_path: PathBuf::from("magister.db") } }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();

  let store_path = match args.store {
    Some(path) => path,
    None => {
      let cfg: CtlConfig = config::Config::builder()
        .add_source(config::File::from(args.config.as_path()).required(false))
        .add_source(config::Environment::with_prefix("MAGISTER"))
        .build()
        .context("failed to read config file")?
        .try_deserialize()
        .context("failed to deserialise config")?;
      expand_tilde(&cfg.store_path)
    }
  };

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let message = run(&store, args.command, read_password).await?;
  println!("{message}");
  Ok(())
}

/// Execute one command, returning the line to print on success.
async fn run<S, P>(store: &S, command: Command, prompt: P) -> Result<String>
where
  S: UserStore,
  P: Fn() -> Result<String>,
{
  match command {
    Command::Register { login, email, password, inactive } => {
      let password = password.map_or_else(&prompt, Ok)?;
      if password.is_empty() {
        bail!("password must not be empty");
      }
      let mut user = store.create(&login, &email, &password).await?;
      if !inactive {
        store.activate(&mut user).await?;
      }
      let state = if user.is_active { "active" } else { "inactive" };
      Ok(format!("created {state} user {} (id {})", user.login, user.id))
    }
    Command::Delete { login } => {
      let user = find(store, &login).await?;
      store.delete(&user).await?;
      Ok(format!("deleted user {login}"))
    }
    Command::Activate { login } => {
      let mut user = find(store, &login).await?;
      if user.is_active {
        return Ok(format!("user {login} is already active"));
      }
      store.activate(&mut user).await?;
      Ok(format!("activated user {login}"))
    }
    Command::Passwd { login, password } => {
      let mut user = find(store, &login).await?;
      let password = password.map_or_else(&prompt, Ok)?;
      if password.is_empty() {
        bail!("password must not be empty");
      }
      store.set_password(&mut user, &password).await?;
      store.save(&mut user).await?;
      Ok(format!("password changed for {login}"))
    }
  }
}

async fn find<S: UserStore>(store: &S, login: &str) -> Result<magister_core::user::User> {
  store
    .find_by_login(login)
    .await?
    .with_context(|| format!("no such user: {login}"))
}

/// First line of stdin, without its line ending.
fn read_password() -> Result<String> {
  eprint!("Password: ");
  let line = io::stdin().lines().next().context("no password on stdin")??;
  Ok(line)
}

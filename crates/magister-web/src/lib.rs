//! HTTP layer for Magister.
//!
//! Exposes an axum [`Router`] serving the login, logout and profile pages,
//! with every request passing through the session [`gate`] first. Works
//! against any store implementing both [`UserStore`] and [`SessionStore`].

pub mod cookie;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod view;

pub use error::Error;

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware, routing::get};
use chrono::TimeDelta;
use magister_core::store::{SessionStore, UserStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{
  ALREADY_LOGGED_IN_PATH, ALREADY_LOGGED_OUT_PATH, LOGIN_PATH, LOGIN_REQUIRED_PATH, LOGOUT_PATH,
  login, logout, pages, profile,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `MAGISTER_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  /// `Domain` attribute for the session cookie; host-only when unset.
  pub domain:                Option<String>,
  pub store_path:            PathBuf,
  pub session_validity_days: u32,
  /// Path fragments that require an authenticated caller.
  pub auth_required:         Vec<String>,
  pub store_timeout_ms:      u64,
  pub cookie_name:           String,
  pub secure_cookies:        bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  8080,
      domain:                None,
      store_path:            PathBuf::from("magister.db"),
      session_validity_days: magister_store_sqlite::DEFAULT_SESSION_VALIDITY_DAYS,
      auth_required:         vec!["/profile/".to_string()],
      store_timeout_ms:      5000,
      cookie_name:           "s3ss1onk3y".to_string(),
      secure_cookies:        false,
    }
  }
}

impl ServerConfig {
  pub fn session_validity(&self) -> TimeDelta {
    TimeDelta::days(i64::from(self.session_validity_days))
  }

  pub fn store_timeout(&self) -> Duration { Duration::from_millis(self.store_timeout_ms) }

  /// Whether `path` contains one of the configured protected fragments.
  ///
  /// Empty fragments are ignored and the login-required page itself is
  /// never protected.
  pub fn requires_auth(&self, path: &str) -> bool {
    path != LOGIN_REQUIRED_PATH
      && self
        .auth_required
        .iter()
        .any(|fragment| !fragment.is_empty() && path.contains(fragment.as_str()))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

impl<S> AppState<S> {
  /// Await a store call under the configured timeout.
  pub async fn bounded<T, E, F>(&self, call: F) -> Result<T, Error>
  where
    F: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
  {
    match tokio::time::timeout(self.config.store_timeout(), call).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => Err(Error::Store(Box::new(e))),
      Err(_) => Err(Error::Timeout),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: UserStore + SessionStore + Clone + 'static,
{
  Router::new()
    .route("/",                     get(pages::index::<S>))
    .route(LOGIN_PATH,              get(login::form).post(login::submit::<S>))
    .route(LOGOUT_PATH,             get(logout::handler::<S>))
    .route(LOGIN_REQUIRED_PATH,     get(pages::login_required))
    .route(ALREADY_LOGGED_IN_PATH,  get(pages::already_logged_in))
    .route(ALREADY_LOGGED_OUT_PATH, get(pages::already_logged_out))
    .route("/profile/{tab}/",       get(profile::show::<S>).post(profile::submit::<S>))
    .fallback(pages::not_found)
    .layer(middleware::from_fn_with_state(state.clone(), gate::gate::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

//! Session gate: resolves the caller's [`Identity`] from the session cookie
//! and keeps anonymous callers out of protected paths.
//!
//! The gate runs once per request, before routing reaches a handler. It
//! leaves the resolved identity in the request extensions, where handlers
//! pick it up with `Extension<Identity>` or the [`Authenticated`] extractor.

use axum::{
  extract::{FromRequestParts, Request, State},
  http::request::Parts,
  middleware::Next,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use magister_core::{
  identity::Identity,
  store::{SessionStore, UserStore},
};
use tracing::debug;

use crate::{AppState, Error, handlers::LOGIN_REQUIRED_PATH};

/// Middleware entry point; mount with `axum::middleware::from_fn_with_state`.
pub async fn gate<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  mut req: Request,
  next: Next,
) -> Response
where
  S: UserStore + SessionStore + Clone + 'static,
{
  let identity = match resolve(&state, &jar).await {
    Ok(identity) => identity,
    Err(e) => return e.into_response(),
  };

  let path = req.uri().path();
  if !identity.is_authenticated() && state.config.requires_auth(path) {
    debug!(path, "anonymous request to protected path");
    return Redirect::to(LOGIN_REQUIRED_PATH).into_response();
  }

  req.extensions_mut().insert(identity);
  next.run(req).await
}

/// Anonymous unless the cookie carries a currently valid key.
pub async fn resolve<S>(state: &AppState<S>, jar: &CookieJar) -> Result<Identity, Error>
where
  S: SessionStore,
{
  let Some(cookie) = jar.get(&state.config.cookie_name) else {
    return Ok(Identity::Anonymous);
  };
  let status = state.bounded(state.store.validate(cookie.value())).await?;
  Ok(Identity::from(status))
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// The subject behind an authenticated request.
///
/// Extraction fails with a redirect to the login-required page when the
/// gate resolved the caller as anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated {
  pub subject_id: i64,
}

impl<S: Send + Sync> FromRequestParts<S> for Authenticated {
  type Rejection = Error;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    match parts.extensions.get::<Identity>() {
      Some(Identity::Authenticated { subject_id }) => Ok(Self { subject_id: *subject_id }),
      _ => Err(Error::LoginRequired),
    }
  }
}

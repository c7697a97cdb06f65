//! `GET /logout/`.

use axum::{
  Extension,
  extract::State,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use magister_core::{identity::Identity, store::SessionStore};
use tracing::info;

use super::ALREADY_LOGGED_OUT_PATH;
use crate::{AppState, Error, cookie, view};

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Extension(identity): Extension<Identity>,
  jar: CookieJar,
) -> Result<Response, Error>
where
  S: SessionStore,
{
  let Some(subject_id) = identity.subject_id() else {
    return Ok(Redirect::to(ALREADY_LOGGED_OUT_PATH).into_response());
  };

  if let Some(presented) = jar.get(&state.config.cookie_name) {
    state.bounded(state.store.revoke(presented.value())).await?;
  }
  info!(subject_id, "user logged out");

  Ok(
    (
      jar.remove(cookie::removal_cookie(&state.config)),
      view::page(
        "Logged out",
        r#"<p>You have been logged out.</p>
<p><a href="/login/">Log in again</a></p>"#,
      ),
    )
      .into_response(),
  )
}

//! Static and near-static pages.

use axum::{
  Extension,
  extract::State,
  http::StatusCode,
  response::{Html, IntoResponse, Response},
};
use magister_core::{identity::Identity, store::UserStore};

use crate::{
  AppState, Error,
  view::{self, Fragment},
};

const INDEX_ANONYMOUS: &str = r#"<p>You are not logged in.</p>
<p><a href="/login/">Log in</a></p>"#;

const INDEX_AUTHENTICATED: &str = r#"<p>Logged in as <strong>{{login}}</strong>.</p>
<p><a href="/profile/general/">Profile</a> | <a href="/logout/">Log out</a></p>"#;

pub async fn index<S>(
  State(state): State<AppState<S>>,
  Extension(identity): Extension<Identity>,
) -> Result<Html<String>, Error>
where
  S: UserStore,
{
  let Some(subject_id) = identity.subject_id() else {
    return Ok(view::page("Welcome", INDEX_ANONYMOUS));
  };
  // A key that outlived its user reads as anonymous.
  let Some(user) = state.bounded(state.store.find_by_id(subject_id)).await? else {
    return Ok(view::page("Welcome", INDEX_ANONYMOUS));
  };
  let body = view::render(INDEX_AUTHENTICATED, &[("login", Fragment::Text(&user.login))]);
  Ok(view::page("Welcome", &body))
}

pub async fn login_required() -> Html<String> {
  view::page(
    "Login required",
    r#"<p>You need to be logged in to see that page.</p>
<p><a href="/login/">Log in</a></p>"#,
  )
}

pub async fn already_logged_in() -> Html<String> {
  view::page(
    "Already logged in",
    r#"<p>You are already logged in.</p>
<p><a href="/logout/">Log out</a></p>"#,
  )
}

pub async fn already_logged_out() -> Html<String> {
  view::page(
    "Already logged out",
    r#"<p>You are not logged in.</p>
<p><a href="/login/">Log in</a></p>"#,
  )
}

pub async fn not_found() -> Response {
  (StatusCode::NOT_FOUND, view::page("Not found", view::NOT_FOUND)).into_response()
}

//! `GET /login/` and `POST /login/`.

use axum::{
  Extension, Form,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use magister_core::{
  identity::Identity,
  login::{LoginOutcome, authenticate},
  store::{SessionStore, UserStore},
};
use serde::Deserialize;
use tracing::{info, warn};

use super::ALREADY_LOGGED_IN_PATH;
use crate::{
  AppState, Error,
  cookie,
  view::{self, Fragment},
};

const FORM: &str = r#"{{errors}}
<form method="post" action="/login/">
<p><label>Login or email <input name="login" value="{{login}}"></label></p>
<p><label>Password <input type="password" name="password"></label></p>
<p><button type="submit">Log in</button></p>
</form>"#;

const NOT_ACTIVATED: &str =
  "<p>Your account has not been activated yet. Please contact an administrator.</p>";

const LOGGED_IN: &str = r#"<p>You are now logged in.</p>
<p><a href="/profile/general/">Go to your profile</a></p>"#;

/// Fixed wording for every credential failure.
pub const INVALID_CREDENTIALS: &str = "Invalid login or password.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub login:    String,
  #[serde(default)]
  pub password: String,
}

fn form_page(status: StatusCode, login: &str, errors: &[&str]) -> Response {
  let errors = view::error_list(errors);
  let body = view::render(FORM, &[
    ("errors", Fragment::Html(&errors)),
    ("login", Fragment::Text(login)),
  ]);
  (status, view::page("Log in", &body)).into_response()
}

pub async fn form(Extension(identity): Extension<Identity>) -> Response {
  if identity.is_authenticated() {
    return Redirect::to(ALREADY_LOGGED_IN_PATH).into_response();
  }
  form_page(StatusCode::OK, "", &[])
}

pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Extension(identity): Extension<Identity>,
  jar: CookieJar,
  Form(form): Form<LoginForm>,
) -> Result<Response, Error>
where
  S: UserStore + SessionStore,
{
  if let Some(subject_id) = identity.subject_id() {
    warn!(subject_id, "login attempt while already logged in");
    return Ok(Redirect::to(ALREADY_LOGGED_IN_PATH).into_response());
  }

  let mut errors = Vec::new();
  if form.login.is_empty() {
    errors.push("Login should not be empty.");
  }
  if form.password.is_empty() {
    errors.push("Password should not be empty.");
  }
  if !errors.is_empty() {
    return Ok(form_page(StatusCode::BAD_REQUEST, &form.login, &errors));
  }

  let outcome = state
    .bounded(authenticate(state.store.as_ref(), &form.login, &form.password))
    .await?;

  let user = match outcome {
    LoginOutcome::Success(user) => user,
    LoginOutcome::NotActivated(_) => {
      return Ok(view::page("Account not activated", NOT_ACTIVATED).into_response());
    }
    LoginOutcome::InvalidCredentials => {
      return Ok(form_page(StatusCode::BAD_REQUEST, &form.login, &[INVALID_CREDENTIALS]));
    }
  };

  let sk = state.bounded(state.store.issue(user.id)).await?;
  info!(subject_id = user.id, login = %user.login, "user logged in");

  let jar = jar.add(cookie::session_cookie(&state.config, &sk));
  Ok((jar, view::page("Logged in", LOGGED_IN)).into_response())
}

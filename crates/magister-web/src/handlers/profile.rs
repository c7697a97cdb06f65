//! `/profile/{tab}/`: account overview and password change.

use axum::{
  Form,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use magister_core::{store::UserStore, user::User};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
  AppState, Error,
  gate::Authenticated,
  view::{self, Fragment},
};

const TABS: &str = r#"<nav><a href="/profile/general/">General</a> | <a href="/profile/password/">Password</a> | <a href="/logout/">Log out</a></nav>"#;

const GENERAL: &str = r#"{{tabs}}
<dl>
<dt>Login</dt><dd>{{login}}</dd>
<dt>Email</dt><dd>{{email}}</dd>
<dt>Member since</dt><dd>{{created}}</dd>
</dl>"#;

const PASSWORD: &str = r#"{{tabs}}
{{notice}}
<form method="post" action="/profile/password/">
<p><label>Current password <input type="password" name="current-password"></label></p>
<p><label>New password <input type="password" name="new-password"></label></p>
<p><label>Repeat new password <input type="password" name="new-repeated-password"></label></p>
<p><button type="submit">Change password</button></p>
</form>"#;

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
  #[serde(rename = "current-password", default)]
  pub current:  String,
  #[serde(rename = "new-password", default)]
  pub new:      String,
  #[serde(rename = "new-repeated-password", default)]
  pub repeated: String,
}

/// Load the caller's user row; a vanished user is sent to log in again.
async fn current_user<S: UserStore>(state: &AppState<S>, subject_id: i64) -> Result<User, Error> {
  state
    .bounded(state.store.find_by_id(subject_id))
    .await?
    .ok_or(Error::LoginRequired)
}

fn password_page(status: StatusCode, notice: &str) -> Response {
  let body = view::render(PASSWORD, &[
    ("tabs", Fragment::Html(TABS)),
    ("notice", Fragment::Html(notice)),
  ]);
  (status, view::page("Profile", &body)).into_response()
}

pub async fn show<S>(
  State(state): State<AppState<S>>,
  Authenticated { subject_id }: Authenticated,
  Path(tab): Path<String>,
) -> Result<Response, Error>
where
  S: UserStore,
{
  match tab.as_str() {
    "general" => {
      let user = current_user(&state, subject_id).await?;
      let created = user.created_at.format("%Y-%m-%d").to_string();
      let body = view::render(GENERAL, &[
        ("tabs", Fragment::Html(TABS)),
        ("login", Fragment::Text(&user.login)),
        ("email", Fragment::Text(&user.email)),
        ("created", Fragment::Text(&created)),
      ]);
      Ok(view::page("Profile", &body).into_response())
    }
    "password" => Ok(password_page(StatusCode::OK, "")),
    _ => Err(Error::NotFound),
  }
}

pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Authenticated { subject_id }: Authenticated,
  Path(tab): Path<String>,
  Form(form): Form<PasswordForm>,
) -> Result<Response, Error>
where
  S: UserStore,
{
  if tab != "password" {
    return Err(Error::NotFound);
  }

  let mut user = current_user(&state, subject_id).await?;

  let mut errors = Vec::new();
  if !state.bounded(state.store.check_password(&user, &form.current)).await? {
    errors.push("Current password is incorrect.");
  }
  if form.new.is_empty() {
    errors.push("New password should not be empty.");
  }
  if form.new != form.repeated {
    errors.push("New passwords do not match.");
  }
  if !errors.is_empty() {
    warn!(subject_id, failures = errors.len(), "password change rejected");
    return Ok(password_page(StatusCode::BAD_REQUEST, &view::error_list(&errors)));
  }

  state.bounded(state.store.set_password(&mut user, &form.new)).await?;
  state.bounded(state.store.save(&mut user)).await?;
  info!(subject_id, "password changed");

  Ok(password_page(StatusCode::OK, r#"<p class="notice">Your password has been changed.</p>"#))
}

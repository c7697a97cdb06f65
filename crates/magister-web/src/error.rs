//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{handlers::LOGIN_REQUIRED_PATH, view};

#[derive(Debug, Error)]
pub enum Error {
  /// The request needs an authenticated identity and has none.
  #[error("login required")]
  LoginRequired,
  #[error("not found")]
  NotFound,
  #[error("bad request: {0}")]
  BadRequest(String),
  /// A store call exceeded the configured timeout.
  #[error("store call timed out")]
  Timeout,
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::LoginRequired => Redirect::to(LOGIN_REQUIRED_PATH).into_response(),
      Error::NotFound => {
        (StatusCode::NOT_FOUND, view::page("Not found", view::NOT_FOUND)).into_response()
      }
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
      Error::Timeout => {
        error!("store call timed out");
        (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response()
      }
      // Backend details stay in the log.
      Error::Store(e) => {
        error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
      }
    }
  }
}

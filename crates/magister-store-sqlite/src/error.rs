//! Error type for `magister-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] magister_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("blocking task failed: {0}")]
  Blocking(#[from] tokio::task::JoinError),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Registration attempted with a login that is already taken.
  #[error("login already registered: {0:?}")]
  DuplicateLogin(String),

  #[error("{field} longer than {max} bytes")]
  FieldTooLong { field: &'static str, max: usize },

  /// A write targeted a user row that no longer exists.
  #[error("user not found: {0}")]
  UserNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

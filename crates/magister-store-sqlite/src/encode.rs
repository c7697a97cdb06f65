//! Conversions between domain types and the plain-text columns stored in
//! SQLite. Timestamps are RFC 3339 strings.

use chrono::{DateTime, Utc};
use magister_core::{hasher::Credentials, user::User};

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "id, login, email, password, password_salt, is_active, created_at, updated_at";

/// A `users` row as read from SQLite, before timestamp decoding.
pub struct RawUser {
  pub id:            i64,
  pub login:         String,
  pub email:         String,
  pub password:      String,
  pub password_salt: String,
  pub is_active:     bool,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      login:         row.get(1)?,
      email:         row.get(2)?,
      password:      row.get(3)?,
      password_salt: row.get(4)?,
      is_active:     row.get(5)?,
      created_at:    row.get(6)?,
      updated_at:    row.get(7)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:          self.id,
      login:       self.login,
      email:       self.email,
      credentials: Credentials { digest: self.password, salt: self.password_salt },
      is_active:   self.is_active,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

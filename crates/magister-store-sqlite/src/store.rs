//! [`SqliteStore`], the SQLite implementation of [`UserStore`] and
//! [`SessionStore`].

use std::path::Path;

use chrono::{TimeDelta, Utc};
use magister_core::{
  hasher::SecretHasher,
  session::{self, SessionKey, SessionStatus},
  store::{Backend, SessionStore, UserStore},
  user::User,
};
use rusqlite::{OptionalExtension as _, ffi};
use tracing::{debug, info};

use crate::{
  Error, Result,
  encode::{RawUser, USER_COLUMNS, decode_dt, encode_dt},
  schema::SCHEMA,
};

/// Session lifetime used unless [`SqliteStore::with_session_validity`] says
/// otherwise.
pub const DEFAULT_SESSION_VALIDITY_DAYS: u32 = 7;

/// Upper bound on `login` and `email`, in bytes.
pub const MAX_FIELD_LEN: usize = 191;

// ─── Store ───────────────────────────────────────────────────────────────────

/// User and session storage backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn:             tokio_rusqlite::Connection,
  hasher:           SecretHasher,
  session_validity: TimeDelta,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      hasher: SecretHasher::default(),
      session_validity: TimeDelta::days(i64::from(DEFAULT_SESSION_VALIDITY_DAYS)),
    })
  }

  /// Replace the password hasher. All users of one database must share it.
  pub fn with_hasher(mut self, hasher: SecretHasher) -> Self {
    self.hasher = hasher;
    self
  }

  /// How long an issued key stays valid.
  pub fn with_session_validity(mut self, validity: TimeDelta) -> Self {
    self.session_validity = validity;
    self
  }

  pub fn session_validity(&self) -> TimeDelta { self.session_validity }

  async fn find_user_where<P>(&self, clause: &'static str, param: P) -> Result<Option<User>>
  where
    P: rusqlite::ToSql + Send + 'static,
  {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
        Ok(
          conn
            .query_row(&sql, rusqlite::params![param], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  #[cfg(test)]
  pub(crate) async fn backdate_session(
    &self,
    key: &str,
    issued: chrono::DateTime<Utc>,
  ) -> Result<()> {
    let key = key.to_owned();
    let at  = encode_dt(issued);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          r#"UPDATE sessions SET issued = ?1 WHERE "key" = ?2"#,
          rusqlite::params![at, key],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) async fn session_rows(&self, subject_id: i64) -> Result<i64> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE id = ?1",
            rusqlite::params![subject_id],
            |r| r.get(0),
          )?)
        })
        .await?,
    )
  }
}

/// Run CPU-heavy password work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
  F: FnOnce() -> magister_core::Result<T> + Send + 'static,
  T: Send + 'static,
{
  Ok(tokio::task::spawn_blocking(f).await??)
}

fn check_len(field: &'static str, value: &str) -> Result<()> {
  if value.len() > MAX_FIELD_LEN {
    return Err(Error::FieldTooLong { field, max: MAX_FIELD_LEN });
  }
  Ok(())
}

impl Backend for SqliteStore {
  type Error = Error;
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  async fn create(&self, login: &str, email: &str, password: &str) -> Result<User> {
    check_len("login", login)?;
    check_len("email", email)?;

    let hasher      = self.hasher.clone();
    let password    = password.to_owned();
    let credentials = blocking(move || hasher.credentials(&password)).await?;

    let now = Utc::now();
    let mut user = User {
      id: 0,
      login: login.to_owned(),
      email: email.to_owned(),
      credentials,
      is_active: false,
      created_at: now,
      updated_at: now,
    };

    let login_str = user.login.clone();
    let email_str = user.email.clone();
    let digest    = user.credentials.digest.clone();
    let salt      = user.credentials.salt.clone();
    let at_str    = encode_dt(now);

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (
             login, email, password, password_salt, is_active, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
          rusqlite::params![login_str, email_str, digest, salt, at_str],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    user.id = id.ok_or_else(|| Error::DuplicateLogin(user.login.clone()))?;
    info!(subject_id = user.id, login = %user.login, "user created");
    Ok(user)
  }

  async fn find_by_login(&self, login: &str) -> Result<Option<User>> {
    self.find_user_where("login = ?1", login.to_owned()).await
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
    // Email is not unique; the oldest account wins.
    self
      .find_user_where("email = ?1 ORDER BY id LIMIT 1", email.to_owned())
      .await
  }

  async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
    self.find_user_where("id = ?1", id).await
  }

  async fn set_password(&self, user: &mut User, password: &str) -> Result<()> {
    let hasher   = self.hasher.clone();
    let password = password.to_owned();
    let credentials = blocking(move || hasher.credentials(&password)).await?;
    user.set_credentials(credentials);
    Ok(())
  }

  async fn check_password(&self, user: &User, password: &str) -> Result<bool> {
    let hasher      = self.hasher.clone();
    let credentials = user.credentials.clone();
    let password    = password.to_owned();
    blocking(move || credentials.matches(&hasher, &password)).await
  }

  async fn save(&self, user: &mut User) -> Result<()> {
    user.updated_at = Utc::now();

    let id        = user.id;
    let digest    = user.credentials.digest.clone();
    let salt      = user.credentials.salt.clone();
    let is_active = user.is_active;
    let at_str    = encode_dt(user.updated_at);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users
             SET password = ?1, password_salt = ?2, is_active = ?3, updated_at = ?4
           WHERE id = ?5",
          rusqlite::params![digest, salt, is_active, at_str, id],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::UserNotFound(id));
    }
    debug!(subject_id = id, "user saved");
    Ok(())
  }

  async fn activate(&self, user: &mut User) -> Result<()> {
    user.is_active  = true;
    user.updated_at = Utc::now();

    let id     = user.id;
    let at_str = encode_dt(user.updated_at);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET is_active = 1, updated_at = ?1 WHERE id = ?2",
          rusqlite::params![at_str, id],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::UserNotFound(id));
    }
    info!(subject_id = id, "user activated");
    Ok(())
  }

  async fn delete(&self, user: &User) -> Result<()> {
    let login = user.login.clone();

    let (users, sessions): (usize, usize) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let sessions = tx.execute(
          "DELETE FROM sessions WHERE id IN (SELECT id FROM users WHERE login = ?1)",
          rusqlite::params![login],
        )?;
        let users = tx.execute("DELETE FROM users WHERE login = ?1", rusqlite::params![login])?;
        tx.commit()?;
        Ok((users, sessions))
      })
      .await?;

    info!(
      subject_id = user.id,
      login = %user.login,
      deleted = users > 0,
      sessions_revoked = sessions,
      "user deleted"
    );
    Ok(())
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  async fn issue(&self, subject_id: i64) -> Result<SessionKey> {
    let sk = SessionKey::generate(subject_id)?;

    let key    = sk.key.clone();
    let at_str = encode_dt(sk.issued_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          r#"INSERT INTO sessions (id, "key", issued) VALUES (?1, ?2, ?3)"#,
          rusqlite::params![subject_id, key, at_str],
        )?;
        Ok(())
      })
      .await?;

    debug!(subject_id, "session issued");
    Ok(sk)
  }

  async fn validate(&self, key: &str) -> Result<SessionStatus> {
    if !session::is_well_formed(key) {
      return Ok(SessionStatus::Unknown);
    }

    let key_str = key.to_owned();
    let row: Option<(i64, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              r#"SELECT id, issued FROM sessions WHERE "key" = ?1"#,
              rusqlite::params![key_str],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((subject_id, issued)) = row else {
      return Ok(SessionStatus::Unknown);
    };

    let sk = SessionKey { subject_id, key: key.to_owned(), issued_at: decode_dt(&issued)? };
    if sk.is_expired_at(Utc::now(), self.session_validity) {
      debug!(subject_id, issued_at = %sk.issued_at, "session expired");
      return Ok(SessionStatus::Expired { subject_id });
    }

    Ok(SessionStatus::Valid { subject_id })
  }

  async fn revoke(&self, key: &str) -> Result<()> {
    let key_str = key.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(r#"DELETE FROM sessions WHERE "key" = ?1"#, rusqlite::params![key_str])?)
      })
      .await?;

    debug!(removed, "session revoked");
    Ok(())
  }
}

//! Storage traits for users and session keys.
//!
//! Implemented by storage backends (e.g. `magister-store-sqlite`). The web
//! layer and the CLI depend on these abstractions, not on a concrete
//! backend.
//!
//! Neither store keeps in-process mutable state: every call goes to the
//! backend, so concurrent requests only contend on individual rows.

use std::future::Future;

use crate::{
  session::{SessionKey, SessionStatus},
  user::User,
};

/// The error type shared by both stores of one backend.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Credential store ────────────────────────────────────────────────────────

/// Owns [`User`] records.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for
/// backend faults.
pub trait UserStore: Backend {
  /// Register a new, inactive user. Fails without leaving a row behind if
  /// `login` is already taken.
  fn create<'a>(
    &'a self,
    login: &'a str,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + 'a;

  fn find_by_login<'a>(
    &'a self,
    login: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn find_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Rotate salt and digest for `password`. Does not persist; call
  /// [`save`](Self::save) afterwards.
  fn set_password<'a>(
    &'a self,
    user: &'a mut User,
    password: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Derive under the user's salt and compare against the stored digest.
  fn check_password<'a>(
    &'a self,
    user: &'a User,
    password: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Persist digest, salt, active flag; refreshes `updated_at` to now.
  fn save<'a>(
    &'a self,
    user: &'a mut User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Mark the user active and persist immediately.
  fn activate<'a>(
    &'a self,
    user: &'a mut User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove the user (by login) together with all of their session keys.
  fn delete<'a>(
    &'a self,
    user: &'a User,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Session store ───────────────────────────────────────────────────────────

/// Owns [`SessionKey`] records and the expiry policy.
pub trait SessionStore: Backend {
  /// Mint and persist a key for `subject_id`. On error no key exists and no
  /// cookie may be set.
  fn issue(
    &self,
    subject_id: i64,
  ) -> impl Future<Output = Result<SessionKey, Self::Error>> + Send + '_;

  /// Resolve `key`. Expired rows are reported, not deleted.
  fn validate<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<SessionStatus, Self::Error>> + Send + 'a;

  /// Delete `key`. Revoking an unknown key is a no-op.
  fn revoke<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

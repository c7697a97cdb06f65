//! The user record owned by the credential store.

use chrono::{DateTime, Utc};

use crate::{
  Result,
  hasher::{Credentials, SecretHasher},
};

/// A registered account.
///
/// `id` is assigned by the store on creation and never changes. A freshly
/// registered user is inactive until explicitly activated.
///
/// `Debug` is safe to log: [`Credentials`] redacts itself.
#[derive(Debug, Clone)]
pub struct User {
  pub id:          i64,
  pub login:       String,
  pub email:       String,
  pub credentials: Credentials,
  pub is_active:   bool,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl User {
  /// Verify `password` against the stored digest.
  pub fn check_password(&self, hasher: &SecretHasher, password: &str) -> Result<bool> {
    self.credentials.matches(hasher, password)
  }

  /// Replace digest and salt in one step. Nothing is persisted.
  pub fn set_credentials(&mut self, credentials: Credentials) {
    self.credentials = credentials;
  }
}

//! Session keys: bearer tokens minted at login.
//!
//! A key is valid while `now - issued_at` is within the configured window.
//! Expiry is absolute from issuance; nothing renews a key. Expired rows are
//! left in place and simply read back as [`SessionStatus::Expired`].

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rand_core::{OsRng, RngCore as _};

use crate::{Error, Result};

/// Bytes of OS randomness in a key; rendered as twice as many hex chars.
pub const SESSION_KEY_BYTES: usize = 32;

/// Length of a rendered key.
pub const SESSION_KEY_LEN: usize = SESSION_KEY_BYTES * 2;

/// A persisted session key.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey {
  pub subject_id: i64,
  pub key:        String,
  pub issued_at:  DateTime<Utc>,
}

impl fmt::Debug for SessionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SessionKey")
      .field("subject_id", &self.subject_id)
      .field("key", &"<redacted>")
      .field("issued_at", &self.issued_at)
      .finish()
  }
}

impl SessionKey {
  /// A new key for `subject_id`, issued now.
  pub fn generate(subject_id: i64) -> Result<Self> {
    Ok(Self { subject_id, key: generate_key()?, issued_at: Utc::now() })
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>, validity: TimeDelta) -> bool {
    now - self.issued_at > validity
  }

  /// End of the validity window, saturating at the latest representable time.
  pub fn expires_at(&self, validity: TimeDelta) -> DateTime<Utc> {
    self
      .issued_at
      .checked_add_signed(validity)
      .unwrap_or(DateTime::<Utc>::MAX_UTC)
  }
}

/// 32 bytes from the OS RNG, hex-encoded.
pub fn generate_key() -> Result<String> {
  let mut bytes = [0u8; SESSION_KEY_BYTES];
  OsRng
    .try_fill_bytes(&mut bytes)
    .map_err(|e| Error::Random(e.to_string()))?;
  Ok(hex::encode(bytes))
}

/// Whether `key` could have come from [`generate_key`].
///
/// Anything else (empty, truncated, garbage from a tampered cookie) can be
/// rejected without a database round trip.
pub fn is_well_formed(key: &str) -> bool {
  key.len() == SESSION_KEY_LEN && key.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Outcome of looking a key up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
  Valid { subject_id: i64 },
  /// The row exists but its window has passed. It is not deleted.
  Expired { subject_id: i64 },
  /// No such key, or the key is malformed.
  Unknown,
}

impl SessionStatus {
  pub fn is_valid(&self) -> bool { matches!(self, Self::Valid { .. }) }

  /// Subject id, only for a valid key.
  pub fn subject_id(&self) -> Option<i64> {
    match self {
      Self::Valid { subject_id } => Some(*subject_id),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn generated_keys_are_well_formed_and_unique() {
    let a = generate_key().unwrap();
    let b = generate_key().unwrap();
    assert!(is_well_formed(&a));
    assert_eq!(a.len(), SESSION_KEY_LEN);
    assert_ne!(a, b);
  }

  #[test]
  fn malformed_keys_are_rejected() {
    assert!(!is_well_formed(""));
    assert!(!is_well_formed("abc"));
    assert!(!is_well_formed(&"z".repeat(SESSION_KEY_LEN)));
    assert!(!is_well_formed(&"a".repeat(SESSION_KEY_LEN + 1)));
    assert!(!is_well_formed("' OR 1=1 --"));
  }

  #[test]
  fn expiry_is_absolute_from_issuance() {
    let sk = SessionKey::generate(7).unwrap();
    let window = TimeDelta::days(3);

    assert!(!sk.is_expired_at(sk.issued_at, window));
    assert!(!sk.is_expired_at(sk.issued_at + window, window));
    assert!(sk.is_expired_at(sk.issued_at + window + TimeDelta::seconds(1), window));
    assert_eq!(sk.expires_at(window), sk.issued_at + window);
  }

  #[test]
  fn huge_window_saturates_instead_of_overflowing() {
    let sk = SessionKey::generate(7).unwrap();
    let window = TimeDelta::days(i64::from(u32::MAX));

    assert_eq!(sk.expires_at(window), DateTime::<Utc>::MAX_UTC);
    assert!(!sk.is_expired_at(Utc::now(), window));
  }

  #[test]
  fn only_valid_status_yields_a_subject() {
    assert_eq!(SessionStatus::Valid { subject_id: 4 }.subject_id(), Some(4));
    assert_eq!(SessionStatus::Expired { subject_id: 4 }.subject_id(), None);
    assert_eq!(SessionStatus::Unknown.subject_id(), None);
    assert!(!SessionStatus::Expired { subject_id: 4 }.is_valid());
  }

  #[test]
  fn debug_output_redacts_key() {
    let sk = SessionKey::generate(1).unwrap();
    assert!(!format!("{sk:?}").contains(&sk.key));
  }
}

//! Error types for `magister-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Key derivation failed. Never treat this as a successful verification.
  #[error("password derivation failed: {0}")]
  Hash(String),

  /// The OS random source failed; no salt or session key was produced.
  #[error("random source unavailable: {0}")]
  Random(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

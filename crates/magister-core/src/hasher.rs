//! Salted, memory-hard password digests.
//!
//! A digest is `hex(sha256(argon2id(password, salt)))`, always
//! [`DIGEST_HEX_LEN`] characters. Salts come out of the same pipeline: a
//! random seed is run through [`SecretHasher::derive`] with itself as the
//! salt, so what gets stored is never raw RNG output.
//!
//! There is no `verify` primitive here. Callers derive a candidate digest
//! under the stored salt and compare with [`constant_time_eq`]; see
//! [`Credentials::matches`].

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};

use crate::{Error, Result};

/// Length of every digest and salt, in hex characters.
pub const DIGEST_HEX_LEN: usize = 64;

const ARGON2_OUTPUT_LEN: usize = 32;
const SEED_LEN: usize = 32;

// ─── Hasher ──────────────────────────────────────────────────────────────────

/// Derives digests and salts under a fixed Argon2id cost profile.
///
/// Every digest in a deployment must be produced with the same parameters;
/// changing them makes all stored digests unverifiable.
#[derive(Clone)]
pub struct SecretHasher {
  params: Params,
}

impl Default for SecretHasher {
  fn default() -> Self { Self { params: Params::DEFAULT } }
}

impl fmt::Debug for SecretHasher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SecretHasher")
      .field("m_cost", &self.params.m_cost())
      .field("t_cost", &self.params.t_cost())
      .field("p_cost", &self.params.p_cost())
      .finish()
  }
}

impl SecretHasher {
  /// Build a hasher with a custom cost profile (memory in KiB).
  pub fn with_params(memory_kib: u32, iterations: u32, lanes: u32) -> Result<Self> {
    let params = Params::new(memory_kib, iterations, lanes, Some(ARGON2_OUTPUT_LEN))
      .map_err(|e| Error::Hash(e.to_string()))?;
    Ok(Self { params })
  }

  /// Deterministic digest of `password` under `salt`.
  pub fn derive(&self, password: &str, salt: &str) -> Result<String> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
    let mut raw = [0u8; ARGON2_OUTPUT_LEN];
    argon2
      .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut raw)
      .map_err(|e| Error::Hash(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(raw)))
  }

  /// A fresh salt: random seed, derived against itself, then compressed.
  pub fn new_salt(&self) -> Result<String> {
    let mut seed = [0u8; SEED_LEN];
    OsRng
      .try_fill_bytes(&mut seed)
      .map_err(|e| Error::Random(e.to_string()))?;
    let seed = hex::encode(seed);
    self.derive(&seed, &seed)
  }

  /// Fresh salt plus the digest of `password` under it.
  pub fn credentials(&self, password: &str) -> Result<Credentials> {
    let salt   = self.new_salt()?;
    let digest = self.derive(password, &salt)?;
    Ok(Credentials { digest, salt })
  }
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// A password digest together with the salt it was derived under.
///
/// The two only mean something as a pair, so they live and rotate together.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
  pub digest: String,
  pub salt:   String,
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credentials")
      .field("digest", &"<redacted>")
      .field("salt", &"<redacted>")
      .finish()
  }
}

impl Credentials {
  /// `false` when either half is missing; such a user has no usable password.
  pub fn is_usable(&self) -> bool { !self.digest.is_empty() && !self.salt.is_empty() }

  /// Check `password` against these credentials.
  ///
  /// Unusable credentials never match. A derivation error is returned as an
  /// error, not as a mismatch, so callers cannot mistake it for success.
  pub fn matches(&self, hasher: &SecretHasher, password: &str) -> Result<bool> {
    if !self.is_usable() {
      return Ok(false);
    }
    let candidate = hasher.derive(password, &self.salt)?;
    Ok(constant_time_eq(candidate.as_bytes(), self.digest.as_bytes()))
  }
}

/// Byte comparison whose running time does not depend on where inputs differ.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

//! SQLite backend for Magister's user and session stores.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Password derivation runs on
//! tokio's blocking pool for the same reason.

mod encode;
mod schema;
mod store;

pub mod error;
pub mod path;

pub use error::{Error, Result};
pub use path::expand_tilde;
pub use store::{DEFAULT_SESSION_VALIDITY_DAYS, MAX_FIELD_LEN, SqliteStore};

#[cfg(test)]
mod tests;

//! Core types and trait definitions for Magister's credential and session
//! management.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend (`magister-store-sqlite`) and the web layer
//! (`magister-web`) both depend on it.

pub mod error;
pub mod hasher;
pub mod identity;
pub mod login;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, Result};

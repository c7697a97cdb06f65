//! The session cookie that carries a key to the browser.

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use magister_core::session::SessionKey;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::ServerConfig;

/// Cookie for a freshly issued key; expires with the key's window.
pub fn session_cookie(config: &ServerConfig, sk: &SessionKey) -> Cookie<'static> {
  let mut builder = Cookie::build((config.cookie_name.clone(), sk.key.clone()))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .secure(config.secure_cookies)
    .expires(http_expiry(sk.expires_at(config.session_validity())));
  if let Some(domain) = &config.domain {
    builder = builder.domain(domain.clone());
  }
  builder.build()
}

/// Name, path and domain of the session cookie, for `CookieJar::remove`.
pub fn removal_cookie(config: &ServerConfig) -> Cookie<'static> {
  let mut builder = Cookie::build((config.cookie_name.clone(), "")).path("/");
  if let Some(domain) = &config.domain {
    builder = builder.domain(domain.clone());
  }
  builder.build()
}

/// Cookie dates stop at year 9999; later expiries are clamped there.
fn http_expiry(at: DateTime<Utc>) -> OffsetDateTime {
  OffsetDateTime::from_unix_timestamp(at.timestamp())
    .unwrap_or_else(|_| PrimitiveDateTime::MAX.assume_utc())
}

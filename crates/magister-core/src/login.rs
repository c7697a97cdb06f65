//! The login flow: resolve a user, check the password, check activation.

use std::sync::LazyLock;

use chrono::DateTime;
use tracing::{info, warn};

use crate::{
  hasher::{Credentials, DIGEST_HEX_LEN},
  store::UserStore,
  user::User,
};

/// Stand-in checked when no user matches, so an unknown identifier costs
/// the same derivation as a wrong password. Its digest matches nothing.
static DECOY: LazyLock<User> = LazyLock::new(|| User {
  id:          0,
  login:       String::new(),
  email:       String::new(),
  credentials: Credentials {
    digest: "0".repeat(DIGEST_HEX_LEN),
    salt:   "0".repeat(DIGEST_HEX_LEN),
  },
  is_active:   false,
  created_at:  DateTime::UNIX_EPOCH,
  updated_at:  DateTime::UNIX_EPOCH,
});

/// Result of a login attempt that reached the backend without faulting.
#[derive(Debug)]
pub enum LoginOutcome {
  Success(User),
  /// Correct credentials, but the account has not been activated.
  NotActivated(User),
  /// Unknown user or wrong password. Callers must not reveal which.
  InvalidCredentials,
}

/// Authenticate `identifier` (a login, or failing that an email) with
/// `password`.
///
/// Issues no session; that is up to the caller on [`LoginOutcome::Success`].
pub async fn authenticate<S>(
  store:      &S,
  identifier: &str,
  password:   &str,
) -> Result<LoginOutcome, S::Error>
where
  S: UserStore,
{
  let user = match store.find_by_login(identifier).await? {
    Some(user) => Some(user),
    None => store.find_by_email(identifier).await?,
  };

  let Some(user) = user else {
    store.check_password(&DECOY, password).await?;
    warn!(identifier, "login failed: no user with that login or email");
    return Ok(LoginOutcome::InvalidCredentials);
  };

  if !store.check_password(&user, password).await? {
    warn!(subject_id = user.id, "login failed: password mismatch");
    return Ok(LoginOutcome::InvalidCredentials);
  }

  if !user.is_active {
    info!(subject_id = user.id, "login refused: account not activated");
    return Ok(LoginOutcome::NotActivated(user));
  }

  Ok(LoginOutcome::Success(user))
}

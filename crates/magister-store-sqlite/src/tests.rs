//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeDelta, Utc};
use magister_core::{
  hasher::SecretHasher,
  login::{LoginOutcome, authenticate},
  session::SessionStatus,
  store::{SessionStore, UserStore},
};

use crate::{Error, MAX_FIELD_LEN, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
    .with_hasher(SecretHasher::with_params(64, 1, 1).expect("cheap params"))
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_look_up_user() {
  let s = store().await;

  let user = s.create("alice", "a@x.com", "pw").await.unwrap();
  assert!(user.id > 0);
  assert!(!user.is_active);
  assert_eq!(user.credentials.digest.len(), 64);
  assert_eq!(user.credentials.salt.len(), 64);

  let by_login = s.find_by_login("alice").await.unwrap().unwrap();
  let by_email = s.find_by_email("a@x.com").await.unwrap().unwrap();
  let by_id    = s.find_by_id(user.id).await.unwrap().unwrap();

  for found in [&by_login, &by_email, &by_id] {
    assert_eq!(found.id, user.id);
    assert_eq!(found.login, "alice");
    assert_eq!(found.credentials, user.credentials);
  }
}

#[tokio::test]
async fn missing_users_are_none_not_errors() {
  let s = store().await;
  assert!(s.find_by_login("nobody").await.unwrap().is_none());
  assert!(s.find_by_email("nobody@x.com").await.unwrap().is_none());
  assert!(s.find_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn login_lookup_is_case_sensitive() {
  let s = store().await;
  s.create("Alice", "a@x.com", "pw").await.unwrap();
  assert!(s.find_by_login("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_login_is_rejected_and_original_untouched() {
  let s = store().await;
  let original = s.create("alice", "a@x.com", "pw").await.unwrap();

  let err = s.create("alice", "b@y.com", "pw2").await.unwrap_err();
  assert!(matches!(err, Error::DuplicateLogin(ref l) if l == "alice"), "got {err:?}");

  let stored = s.find_by_login("alice").await.unwrap().unwrap();
  assert_eq!(stored.id, original.id);
  assert_eq!(stored.email, "a@x.com");
  assert!(s.check_password(&stored, "pw").await.unwrap());
  assert!(s.find_by_email("b@y.com").await.unwrap().is_none());
}

#[tokio::test]
async fn overlong_fields_are_rejected() {
  let s = store().await;
  let long = "x".repeat(MAX_FIELD_LEN + 1);
  assert!(matches!(
    s.create(&long, "a@x.com", "pw").await,
    Err(Error::FieldTooLong { field: "login", .. })
  ));
  assert!(matches!(
    s.create("alice", &long, "pw").await,
    Err(Error::FieldTooLong { field: "email", .. })
  ));
}

#[tokio::test]
async fn set_password_and_save_round_trip() {
  let s = store().await;
  let mut user = s.create("alice", "a@x.com", "old").await.unwrap();
  let before = user.clone();

  s.set_password(&mut user, "hunter2").await.unwrap();
  assert_ne!(user.credentials.salt, before.credentials.salt);
  assert_ne!(user.credentials.digest, before.credentials.digest);

  // Not persisted until saved.
  let stale = s.find_by_id(user.id).await.unwrap().unwrap();
  assert!(s.check_password(&stale, "old").await.unwrap());

  s.save(&mut user).await.unwrap();
  assert!(user.updated_at >= before.updated_at);

  let fresh = s.find_by_id(user.id).await.unwrap().unwrap();
  assert!(s.check_password(&fresh, "hunter2").await.unwrap());
  assert!(!s.check_password(&fresh, "wrong").await.unwrap());
  assert!(!s.check_password(&fresh, "old").await.unwrap());
  assert_eq!(fresh.updated_at, user.updated_at);
  assert_eq!(fresh.created_at, before.created_at);
}

#[tokio::test]
async fn activate_persists_immediately() {
  let s = store().await;
  let mut user = s.create("alice", "a@x.com", "pw").await.unwrap();

  s.activate(&mut user).await.unwrap();
  assert!(user.is_active);
  assert!(s.find_by_id(user.id).await.unwrap().unwrap().is_active);
}

#[tokio::test]
async fn saving_a_deleted_user_reports_not_found() {
  let s = store().await;
  let mut user = s.create("alice", "a@x.com", "pw").await.unwrap();
  s.delete(&user).await.unwrap();

  assert!(matches!(s.save(&mut user).await, Err(Error::UserNotFound(_))));
}

#[tokio::test]
async fn delete_removes_user_and_their_sessions() {
  let s = store().await;
  let alice = s.create("alice", "a@x.com", "pw").await.unwrap();
  let bob   = s.create("bob", "b@x.com", "pw").await.unwrap();

  let a1 = s.issue(alice.id).await.unwrap();
  let a2 = s.issue(alice.id).await.unwrap();
  let b1 = s.issue(bob.id).await.unwrap();

  s.delete(&alice).await.unwrap();

  assert!(s.find_by_login("alice").await.unwrap().is_none());
  assert_eq!(s.validate(&a1.key).await.unwrap(), SessionStatus::Unknown);
  assert_eq!(s.validate(&a2.key).await.unwrap(), SessionStatus::Unknown);
  assert_eq!(s.session_rows(alice.id).await.unwrap(), 0);

  // Other users are unaffected.
  assert!(s.validate(&b1.key).await.unwrap().is_valid());

  // Deleting again is harmless.
  s.delete(&alice).await.unwrap();
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn issued_key_validates_for_its_subject() {
  let s = store().await;
  let user = s.create("alice", "a@x.com", "pw").await.unwrap();

  let sk = s.issue(user.id).await.unwrap();
  assert_eq!(sk.subject_id, user.id);
  assert_eq!(sk.key.len(), 64);

  assert_eq!(
    s.validate(&sk.key).await.unwrap(),
    SessionStatus::Valid { subject_id: user.id },
  );
}

#[tokio::test]
async fn each_login_gets_a_distinct_key() {
  let s = store().await;
  let user = s.create("alice", "a@x.com", "pw").await.unwrap();

  let a = s.issue(user.id).await.unwrap();
  let b = s.issue(user.id).await.unwrap();
  assert_ne!(a.key, b.key);
  assert!(s.validate(&a.key).await.unwrap().is_valid());
  assert!(s.validate(&b.key).await.unwrap().is_valid());
}

#[tokio::test]
async fn expired_key_is_invalid_but_not_deleted() {
  let s = store().await.with_session_validity(TimeDelta::days(2));
  let user = s.create("alice", "a@x.com", "pw").await.unwrap();
  let sk = s.issue(user.id).await.unwrap();

  s.backdate_session(&sk.key, Utc::now() - TimeDelta::days(3)).await.unwrap();

  let expired = SessionStatus::Expired { subject_id: user.id };
  assert_eq!(s.validate(&sk.key).await.unwrap(), expired);
  // Still there on the second look.
  assert_eq!(s.validate(&sk.key).await.unwrap(), expired);
  assert_eq!(s.session_rows(user.id).await.unwrap(), 1);
}

#[tokio::test]
async fn key_inside_window_stays_valid() {
  let s = store().await.with_session_validity(TimeDelta::days(2));
  let user = s.create("alice", "a@x.com", "pw").await.unwrap();
  let sk = s.issue(user.id).await.unwrap();

  s.backdate_session(&sk.key, Utc::now() - TimeDelta::days(1)).await.unwrap();
  assert!(s.validate(&sk.key).await.unwrap().is_valid());
}

#[tokio::test]
async fn revoked_key_is_invalid_and_revoke_is_idempotent() {
  let s = store().await;
  let user = s.create("alice", "a@x.com", "pw").await.unwrap();
  let sk = s.issue(user.id).await.unwrap();

  s.revoke(&sk.key).await.unwrap();
  assert_eq!(s.validate(&sk.key).await.unwrap(), SessionStatus::Unknown);

  s.revoke(&sk.key).await.unwrap();
  s.revoke("never-issued").await.unwrap();
}

#[tokio::test]
async fn unknown_and_malformed_keys_are_unknown() {
  let s = store().await;
  assert_eq!(s.validate(&"a".repeat(64)).await.unwrap(), SessionStatus::Unknown);
  assert_eq!(s.validate("").await.unwrap(), SessionStatus::Unknown);
  assert_eq!(s.validate("not a key").await.unwrap(), SessionStatus::Unknown);
}

#[tokio::test]
async fn concurrent_issue_and_validate() {
  let s = store().await;
  let id = s.create("alice", "a@x.com", "pw").await.unwrap().id;

  let mut tasks = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    tasks.push(tokio::spawn(async move {
      let sk = s.issue(id).await.unwrap();
      s.validate(&sk.key).await.unwrap()
    }));
  }

  for t in tasks {
    assert_eq!(t.await.unwrap(), SessionStatus::Valid { subject_id: id });
  }
  assert_eq!(s.session_rows(id).await.unwrap(), 8);
}

// ─── Login flow ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn inactive_user_is_refused_until_activated() {
  let s = store().await;
  s.create("alice", "a@x.com", "pw").await.unwrap();

  let LoginOutcome::NotActivated(mut user) = authenticate(&s, "alice", "pw").await.unwrap() else {
    panic!("expected NotActivated");
  };

  s.activate(&mut user).await.unwrap();

  let outcome = authenticate(&s, "alice", "pw").await.unwrap();
  assert!(matches!(outcome, LoginOutcome::Success(ref u) if u.id == user.id));
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
  let s = store().await;
  let mut user = s.create("alice", "a@x.com", "pw").await.unwrap();
  s.activate(&mut user).await.unwrap();

  assert!(matches!(
    authenticate(&s, "alice", "nope").await.unwrap(),
    LoginOutcome::InvalidCredentials
  ));
  assert!(matches!(
    authenticate(&s, "mallory", "pw").await.unwrap(),
    LoginOutcome::InvalidCredentials
  ));
}

#[tokio::test]
async fn email_works_as_a_login_fallback() {
  let s = store().await;
  let mut user = s.create("alice", "a@x.com", "pw").await.unwrap();
  s.activate(&mut user).await.unwrap();

  let outcome = authenticate(&s, "a@x.com", "pw").await.unwrap();
  assert!(matches!(outcome, LoginOutcome::Success(ref u) if u.login == "alice"));
}

#[tokio::test]
async fn login_match_takes_precedence_over_email_match() {
  let s = store().await;
  // carol's email is literally "dave"; dave is a separate login.
  let mut carol = s.create("carol", "dave", "carol-pw").await.unwrap();
  let mut dave  = s.create("dave", "d@x.com", "dave-pw").await.unwrap();
  s.activate(&mut carol).await.unwrap();
  s.activate(&mut dave).await.unwrap();

  let outcome = authenticate(&s, "dave", "dave-pw").await.unwrap();
  assert!(matches!(outcome, LoginOutcome::Success(ref u) if u.id == dave.id));

  // carol's password does not work through the "dave" identifier.
  assert!(matches!(
    authenticate(&s, "dave", "carol-pw").await.unwrap(),
    LoginOutcome::InvalidCredentials
  ));
}

//! HTTP Basic-auth extractor.
//!
//! Credentials are `email:password`; the password is checked against the
//! account's argon2 PHC string. Every failure mode collapses into the same
//! [`ApiError::Unauthorized`].

use std::sync::OnceLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use habitly_core::store::HabitStore;
use rand_core::OsRng;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The authenticated caller. The inner id is the owner of every habit the
/// request may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Authenticated(pub Uuid);

/// Pull `(email, password)` out of an `Authorization: Basic …` header.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded.trim()).map_err(|_| ApiError::Unauthorized)?;
  let creds   = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

fn verify_password(password: &str, phc: &str) -> Result<(), ApiError> {
  let parsed_hash = PasswordHash::new(phc).map_err(|_| ApiError::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)
}

/// A throwaway PHC string with the same argon2 parameters as real accounts.
/// Verifying against it when the email is unknown keeps a miss as slow as a
/// wrong password.
fn dummy_hash() -> Option<&'static str> {
  static DUMMY: OnceLock<Option<String>> = OnceLock::new();
  DUMMY
    .get_or_init(|| {
      let salt = SaltString::generate(&mut OsRng);
      Argon2::default()
        .hash_password(b"habitly-unknown-account", &salt)
        .ok()
        .map(|h| h.to_string())
    })
    .as_deref()
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: HabitStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (email, password) = basic_credentials(&parts.headers)?;

    let account = state
      .store
      .find_account_by_email(&email)
      .await
      .map_err(ApiError::from_store)?;

    let Some(account) = account else {
      if let Some(phc) = dummy_hash() {
        verify_password(&password, phc).ok();
      }
      return Err(ApiError::Unauthorized);
    };

    verify_password(&password, &account.password_hash)?;

    tracing::debug!(account_id = %account.id, "authenticated");
    Ok(Authenticated(account.id))
  }
}

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, sync::Arc};

  use axum::{body::Body, http::Request};
  use chrono::{NaiveDate, Utc};
  use habitly_core::{
    account::{Account, NewAccount},
    habit::{Habit, NewHabit},
    page::{Page, PageRequest},
  };

  use super::*;

  // A store that knows exactly one account and nothing else.
  struct OneAccount(Account);

  impl HabitStore for OneAccount {
    type Error = Infallible;
    async fn create_account(&self, _: NewAccount) -> Result<Account, Self::Error> { unimplemented!() }
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, Self::Error> {
      Ok((email == self.0.email).then(|| self.0.clone()))
    }
    async fn find_by_owner_and_name(&self, _: Uuid, _: &str) -> Result<Option<Habit>, Self::Error> { unimplemented!() }
    async fn insert(&self, _: NewHabit) -> Result<Habit, Self::Error> { unimplemented!() }
    async fn list_by_owner(&self, _: Uuid, _: PageRequest) -> Result<Page<Habit>, Self::Error> { unimplemented!() }
    async fn list_due_today(&self, _: Uuid, _: NaiveDate, _: PageRequest) -> Result<Page<Habit>, Self::Error> { unimplemented!() }
  }

  fn make_state(password: &str) -> AppState<OneAccount> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState::new(Arc::new(OneAccount(Account {
      id:            Uuid::new_v4(),
      email:         "ada@example.com".to_string(),
      name:          "Ada".to_string(),
      password_hash: hash,
      created_at:    Utc::now(),
    })))
  }

  async fn extract(req: Request<Body>, state: &AppState<OneAccount>) -> Result<Authenticated, ApiError> {
    let (mut parts, _) = req.into_parts();
    Authenticated::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[tokio::test]
  async fn correct_credentials_yield_owner_id() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("ada@example.com", "secret"))
      .body(Body::empty()).unwrap();
    let Authenticated(owner) = extract(req, &state).await.unwrap();
    assert_eq!(owner, state.store.0.id);
  }

  #[tokio::test]
  async fn password_may_contain_colons() {
    let state = make_state("a:b:c");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("ada@example.com", "a:b:c"))
      .body(Body::empty()).unwrap();
    assert!(extract(req, &state).await.is_ok());
  }

  #[tokio::test]
  async fn wrong_password() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("ada@example.com", "wrong"))
      .body(Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthorized)));
  }

  #[tokio::test]
  async fn unknown_email() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, basic("bob@example.com", "secret"))
      .body(Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthorized)));
  }

  #[test]
  fn unknown_email_still_runs_a_real_verify() {
    let phc = dummy_hash().unwrap();
    let parsed = PasswordHash::new(phc).unwrap();
    assert_eq!(parsed.algorithm, argon2::Algorithm::Argon2id.ident());
    assert!(matches!(verify_password("anything", phc), Err(ApiError::Unauthorized)));
    assert_eq!(dummy_hash(), Some(phc));
  }

  #[tokio::test]
  async fn missing_header() {
    let state = make_state("secret");
    let req = Request::builder().body(Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthorized)));
  }

  #[tokio::test]
  async fn invalid_base64() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Basic !!!not-base64!!!")
      .body(Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthorized)));
  }

  #[tokio::test]
  async fn bearer_scheme_is_rejected() {
    let state = make_state("secret");
    let req = Request::builder()
      .header(header::AUTHORIZATION, "Bearer abc")
      .body(Body::empty()).unwrap();
    assert!(matches!(extract(req, &state).await, Err(ApiError::Unauthorized)));
  }
}

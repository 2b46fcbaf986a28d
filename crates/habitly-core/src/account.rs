//! Accounts: the identities that own habits.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered user. The `id` is the `owner_id` of every habit they create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  pub id:            Uuid,
  pub email:         String,
  pub name:          String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  #[serde(skip)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::HabitStore::create_account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email:         String,
  pub name:          String,
  pub password_hash: String,
}

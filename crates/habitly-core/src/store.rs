//! The `HabitStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `habitly-store-sqlite`).
//! Higher layers (`habitly-api`, `habitly-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  account::{Account, NewAccount},
  habit::{Habit, NewHabit},
  page::{Page, PageRequest},
};

/// Error bound for store backends.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `true` when the failure is a uniqueness violation (duplicate habit name
  /// for an owner, duplicate account email) rather than an opaque fault.
  fn is_conflict(&self) -> bool;
}

impl StoreError for std::convert::Infallible {
  fn is_conflict(&self) -> bool { match *self {} }
}

/// Abstraction over a Habitly storage backend.
///
/// Every habit read is scoped to a single owner. All methods return `Send`
/// futures so the trait can be used in multi-threaded async runtimes (e.g.
/// tokio with `axum`).
pub trait HabitStore: Send + Sync {
  type Error: StoreError;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new account. Fails with a conflict if the email is taken.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  /// Look up an account by its (case-sensitive) email.
  fn find_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  // ── Habits ────────────────────────────────────────────────────────────

  /// The owner's habit with exactly this name, if any.
  fn find_by_owner_and_name<'a>(
    &'a self,
    owner_id: Uuid,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + 'a;

  /// Persist a validated habit. `id` and `created_at` are assigned here.
  ///
  /// A duplicate (owner, name) pair fails with a conflict and writes nothing.
  fn insert(
    &self,
    habit: NewHabit,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + '_;

  /// One page of the owner's habits, newest first.
  fn list_by_owner(
    &self,
    owner_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Habit>, Self::Error>> + Send + '_;

  /// One page of the owner's habits that are due on `date`, newest first.
  ///
  /// Results must agree exactly with [`crate::recurrence::is_due`].
  fn list_due_today(
    &self,
    owner_id: Uuid,
    date: NaiveDate,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Habit>, Self::Error>> + Send + '_;
}

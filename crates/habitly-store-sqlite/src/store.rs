//! The SQLite implementation of [`HabitStore`].

use std::path::Path;

use chrono::{Datelike as _, NaiveDate, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use habitly_core::{
  account::{Account, NewAccount},
  habit::{Habit, NewHabit},
  page::{Page, PageRequest},
  store::HabitStore,
};

use crate::{
  encode::{
    HABIT_COLUMNS, RawAccount, RawHabit, encode_date, encode_dt, encode_frequency,
    encode_frequency_data, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

/// The due-today rules as a SQL predicate over `habits h`.
///
/// `?4` is the weekday index of the reference date (0 = Sunday) and `?5` the
/// reference date as `YYYY-MM-DD`. Rows whose `frequency` disagrees with the
/// payload's `$.type` never match. `julianday` differences between two
/// midnight dates are whole numbers of days.
const DUE_PREDICATE: &str = "
  (
    (h.frequency = 'daily' AND json_extract(h.frequency_data, '$.type') = 'daily')
    OR (
      h.frequency = 'weekly'
      AND json_extract(h.frequency_data, '$.type') = 'weekly'
      AND EXISTS (
        SELECT 1 FROM json_each(h.frequency_data, '$.daysOfWeek') d WHERE d.value = ?4
      )
    )
    OR (
      h.frequency = 'custom'
      AND json_extract(h.frequency_data, '$.type') = 'custom'
      AND (
        h.last_completed_at IS NULL
        OR julianday(?5) - julianday(date(h.last_completed_at))
           >= json_extract(h.frequency_data, '$.interval')
              * CASE json_extract(h.frequency_data, '$.unit')
                  WHEN 'days'  THEN 1
                  WHEN 'weeks' THEN 7
                END
      )
    )
  )";

/// Keyset predicate: rows strictly after the cursor (`?2` = created_at,
/// `?3` = habit_id) in `created_at DESC, habit_id DESC` order.
const AFTER_CURSOR: &str = "
  (?2 IS NULL OR h.created_at < ?2 OR (h.created_at = ?2 AND h.habit_id < ?3))";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Habitly store backed by a single SQLite file.
///
/// Clones share one background connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Only `UNIQUE` failures count; NOT NULL, CHECK and PRIMARY KEY failures
/// stay opaque database errors.
fn is_unique_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a fresh in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run one page query. `extra` is a predicate ANDed onto the owner and
  /// cursor filters, plus the values bound to its `?4` and `?5`.
  async fn page_query(
    &self,
    owner_id: Uuid,
    page: PageRequest,
    extra: Option<(&'static str, i64, String)>,
  ) -> Result<Page<Habit>> {
    let owner_str  = encode_uuid(owner_id);
    let cursor_at  = page.cursor.map(|c| encode_dt(c.created_at));
    let cursor_id  = page.cursor.map(|c| encode_uuid(c.id));
    let fetch      = page.fetch_limit() as i64;

    let raws: Vec<RawHabit> = self
      .conn
      .call(move |conn| {
        let (predicate, weekday, date) = match extra {
          Some((p, w, d)) => (p, Some(w), Some(d)),
          None => ("1", None, None),
        };

        let sql = format!(
          "SELECT {HABIT_COLUMNS}
           FROM habits h
           WHERE h.owner_id = ?1
             AND {AFTER_CURSOR}
             AND {predicate}
           ORDER BY h.created_at DESC, h.habit_id DESC
           LIMIT ?6"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, cursor_at, cursor_id, weekday, date, fetch],
            RawHabit::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    let rows = raws
      .into_iter()
      .map(RawHabit::into_habit)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::from_overfetch(rows, page.limit))
  }
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let account = Account {
      id:            Uuid::new_v4(),
      email:         input.email,
      name:          input.name,
      password_hash: input.password_hash,
      created_at:    Utc::now().trunc_subsecs(6),
    };

    let id_str    = encode_uuid(account.id);
    let email     = account.email.clone();
    let name      = account.name.clone();
    let hash      = account.password_hash.clone();
    let at_str    = encode_dt(account.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (account_id, email, name, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, email, name, hash, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          Error::Core(habitly_core::Error::EmailTaken(account.email.clone()))
        } else {
          Error::Database(e)
        }
      })?;

    Ok(account)
  }

  async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
    let email = email.to_owned();

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT account_id, email, name, password_hash, created_at
             FROM accounts WHERE email = ?1",
            rusqlite::params![email],
            |row| {
              Ok(RawAccount {
                account_id:    row.get(0)?,
                email:         row.get(1)?,
                name:          row.get(2)?,
                password_hash: row.get(3)?,
                created_at:    row.get(4)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawAccount::into_account).transpose()
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn find_by_owner_and_name(&self, owner_id: Uuid, name: &str) -> Result<Option<Habit>> {
    let owner_str = encode_uuid(owner_id);
    let name      = name.to_owned();

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE owner_id = ?1 AND name = ?2"),
            rusqlite::params![owner_str, name],
            RawHabit::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn insert(&self, input: NewHabit) -> Result<Habit> {
    let habit = Habit {
      id:                Uuid::new_v4(),
      owner_id:          input.owner_id,
      frequency:         input.frequency(),
      name:              input.name,
      description:       input.description,
      color:             input.color,
      frequency_data:    input.frequency_data,
      last_completed_at: None,
      created_at:        Utc::now().trunc_subsecs(6),
    };

    let id_str        = encode_uuid(habit.id);
    let owner_str     = encode_uuid(habit.owner_id);
    let name          = habit.name.clone();
    let description   = habit.description.clone();
    let color         = habit.color.to_string();
    let frequency     = encode_frequency(habit.frequency);
    let data_json     = encode_frequency_data(&habit.frequency_data)?;
    let created_str   = encode_dt(habit.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habits (
             habit_id, owner_id, name, description, color,
             frequency, frequency_data, last_completed_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8)",
          rusqlite::params![
            id_str,
            owner_str,
            name,
            description,
            color,
            frequency,
            data_json,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          Error::Core(habitly_core::Error::HabitNameTaken(habit.name.clone()))
        } else {
          Error::Database(e)
        }
      })?;

    tracing::debug!(habit_id = %habit.id, owner_id = %habit.owner_id, "habit inserted");
    Ok(habit)
  }

  async fn list_by_owner(&self, owner_id: Uuid, page: PageRequest) -> Result<Page<Habit>> {
    self.page_query(owner_id, page, None).await
  }

  async fn list_due_today(
    &self,
    owner_id: Uuid,
    date:     NaiveDate,
    page:     PageRequest,
  ) -> Result<Page<Habit>> {
    let weekday = i64::from(date.weekday().num_days_from_sunday());
    self
      .page_query(owner_id, page, Some((DUE_PREDICATE, weekday, encode_date(date))))
      .await
  }
}

// ─── Test support ────────────────────────────────────────────────────────────

#[cfg(test)]
impl SqliteStore {
  /// Execute arbitrary SQL with text parameters, bypassing validation.
  pub(crate) async fn execute_raw(&self, sql: &'static str, params: Vec<Option<String>>) -> Result<usize> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(conn.execute(sql, rusqlite::params_from_iter(params))?))
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn failure(sql: &str) -> tokio_rusqlite::Error {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn
      .execute_batch(
        "CREATE TABLE t (
           id    TEXT PRIMARY KEY,
           name  TEXT NOT NULL UNIQUE,
           n     INTEGER CHECK (n > 0)
         );
         INSERT INTO t (id, name, n) VALUES ('a', 'Read', 1);",
      )
      .unwrap();
    tokio_rusqlite::Error::Rusqlite(conn.execute(sql, []).unwrap_err())
  }

  #[test]
  fn only_unique_failures_are_conflicts() {
    assert!(is_unique_violation(&failure("INSERT INTO t (id, name, n) VALUES ('b', 'Read', 1)")));

    assert!(!is_unique_violation(&failure("INSERT INTO t (id, name, n) VALUES ('c', NULL, 1)")));
    assert!(!is_unique_violation(&failure("INSERT INTO t (id, name, n) VALUES ('d', 'Gym', 0)")));
    assert!(!is_unique_violation(&failure("INSERT INTO t (id, name, n) VALUES ('a', 'Gym', 1)")));
  }
}

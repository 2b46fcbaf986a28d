//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so lexical order equals chronological order and SQLite's
//! `date()` can read them. `frequency_data` is stored as compact JSON. UUIDs
//! are stored as hyphenated lowercase strings, whose lexical order matches
//! `Uuid`'s byte order.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use habitly_core::{
  account::Account,
  frequency::{Frequency, FrequencyData},
  habit::Habit,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

// ─── Frequency ────────────────────────────────────────────────────────────────

pub fn encode_frequency(f: Frequency) -> &'static str { f.as_str() }

pub fn decode_frequency(s: &str) -> Result<Frequency> {
  match s {
    "daily" => Ok(Frequency::Daily),
    "weekly" => Ok(Frequency::Weekly),
    "custom" => Ok(Frequency::Custom),
    other => Err(Error::UnknownFrequency(other.to_owned())),
  }
}

pub fn encode_frequency_data(d: &FrequencyData) -> Result<String> { Ok(serde_json::to_string(d)?) }

pub fn decode_frequency_data(s: &str) -> Result<FrequencyData> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawHabit::from_row`].
pub const HABIT_COLUMNS: &str = "habit_id, owner_id, name, description, color, frequency, \
                                 frequency_data, last_completed_at, created_at";

/// Raw strings read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id:          String,
  pub owner_id:          String,
  pub name:              String,
  pub description:       Option<String>,
  pub color:             String,
  pub frequency:         String,
  pub frequency_data:    String,
  pub last_completed_at: Option<String>,
  pub created_at:        String,
}

impl RawHabit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      habit_id:          row.get(0)?,
      owner_id:          row.get(1)?,
      name:              row.get(2)?,
      description:       row.get(3)?,
      color:             row.get(4)?,
      frequency:         row.get(5)?,
      frequency_data:    row.get(6)?,
      last_completed_at: row.get(7)?,
      created_at:        row.get(8)?,
    })
  }

  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      id:                decode_uuid(&self.habit_id)?,
      owner_id:          decode_uuid(&self.owner_id)?,
      name:              self.name,
      description:       self.description,
      color:             self.color.parse()?,
      frequency:         decode_frequency(&self.frequency)?,
      frequency_data:    decode_frequency_data(&self.frequency_data)?,
      last_completed_at: self.last_completed_at.as_deref().map(decode_dt).transpose()?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:    String,
  pub email:         String,
  pub name:          String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawAccount {
  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      id:            decode_uuid(&self.account_id)?,
      email:         self.email,
      name:          self.name,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

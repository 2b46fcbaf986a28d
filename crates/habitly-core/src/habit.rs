//! A recurring, user-defined task and its display color.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  frequency::{Frequency, FrequencyData},
  recurrence,
};

// ─── Color ───────────────────────────────────────────────────────────────────

/// A `#rrggbb` color code. Case is preserved as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color(String);

impl Color {
  pub fn as_str(&self) -> &str { &self.0 }
}

impl FromStr for Color {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let valid = s.len() == 7
      && s.starts_with('#')
      && s[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
      Ok(Self(s.to_owned()))
    } else {
      Err(Error::InvalidColor(s.to_owned()))
    }
  }
}

impl TryFrom<String> for Color {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<Color> for String {
  fn from(c: Color) -> Self { c.0 }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Habit ───────────────────────────────────────────────────────────────────

/// A persisted habit.
///
/// `frequency` and `frequency_data` are stored independently; write-time
/// validation guarantees they agree, and evaluation treats a disagreeing
/// record as never due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
  pub id:                Uuid,
  pub owner_id:          Uuid,
  pub name:              String,
  pub description:       Option<String>,
  pub color:             Color,
  pub frequency:         Frequency,
  pub frequency_data:    FrequencyData,
  /// `None` until the habit is completed for the first time.
  pub last_completed_at: Option<DateTime<Utc>>,
  /// Server-assigned; the pagination sort key.
  pub created_at:        DateTime<Utc>,
}

impl Habit {
  /// Whether this habit is due on `date`. See [`recurrence::is_due`].
  pub fn is_due_on(&self, date: NaiveDate) -> bool {
    recurrence::is_due(self.frequency, &self.frequency_data, date, self.last_completed_at)
  }
}

// ─── NewHabit ────────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::HabitStore::insert`].
/// `id` and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
  pub owner_id:       Uuid,
  pub name:           String,
  pub description:    Option<String>,
  pub color:          Color,
  pub frequency_data: FrequencyData,
}

impl NewHabit {
  /// The frequency persisted alongside the payload; always the payload's tag.
  pub fn frequency(&self) -> Frequency { self.frequency_data.frequency() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn color_accepts_either_case() {
    assert!("#a1B2c3".parse::<Color>().is_ok());
    assert!("#FFFFFF".parse::<Color>().is_ok());
  }

  #[test]
  fn color_rejects_malformed() {
    for bad in ["", "a1b2c3", "#a1b2c", "#a1b2c3d", "#g1b2c3", "##12345"] {
      assert!(bad.parse::<Color>().is_err(), "{bad:?} should be rejected");
    }
  }
}

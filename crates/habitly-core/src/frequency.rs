//! Recurrence kinds and their structured parameters.
//!
//! `Frequency` is the bare discriminant persisted alongside each habit;
//! `FrequencyData` is the tagged payload whose shape depends on it. The two
//! are stored separately so a corrupted row can be detected on read.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Frequency ───────────────────────────────────────────────────────────────

/// The recurrence kind of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
  Daily,
  Weekly,
  Custom,
}

impl Frequency {
  /// The discriminant string stored in the `frequency` column.
  /// Must match the `rename_all = "lowercase"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Daily => "daily",
      Self::Weekly => "weekly",
      Self::Custom => "custom",
    }
  }
}

impl fmt::Display for Frequency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── IntervalUnit ────────────────────────────────────────────────────────────

/// Unit of a custom interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
  Days,
  Weeks,
}

impl IntervalUnit {
  /// Length of one unit in calendar days.
  pub fn days(self) -> i64 {
    match self {
      Self::Days => 1,
      Self::Weeks => 7,
    }
  }
}

// ─── WeekdaySet ──────────────────────────────────────────────────────────────

/// A non-empty set of weekday indices, 0 = Sunday through 6 = Saturday.
///
/// Serialised as a sorted JSON array (`[1, 3, 5]`), which is also the shape
/// the SQLite backend queries with `json_each`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
  /// Build a set from raw indices. Rejects empty input, indices above 6, and
  /// duplicates.
  pub fn from_indices(indices: &[u8]) -> Result<Self> {
    if indices.is_empty() {
      return Err(Error::InvalidWeekdays("at least one day is required".into()));
    }
    let mut bits = 0u8;
    for &idx in indices {
      if idx > 6 {
        return Err(Error::InvalidWeekdays(format!("{idx} is not a weekday index")));
      }
      let bit = 1 << idx;
      if bits & bit != 0 {
        return Err(Error::InvalidWeekdays(format!("day {idx} appears twice")));
      }
      bits |= bit;
    }
    Ok(Self(bits))
  }

  pub fn contains_index(self, idx: u8) -> bool { idx <= 6 && self.0 & (1 << idx) != 0 }

  pub fn contains(self, day: Weekday) -> bool {
    self.contains_index(day.num_days_from_sunday() as u8)
  }

  /// Indices in ascending order.
  pub fn iter(self) -> impl Iterator<Item = u8> {
    (0..7).filter(move |&i| self.contains_index(i))
  }

  pub fn len(self) -> usize { self.0.count_ones() as usize }

  pub fn is_empty(self) -> bool { self.0 == 0 }
}

impl fmt::Debug for WeekdaySet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}

impl From<WeekdaySet> for Vec<u8> {
  fn from(set: WeekdaySet) -> Self { set.iter().collect() }
}

impl TryFrom<Vec<u8>> for WeekdaySet {
  type Error = Error;

  fn try_from(indices: Vec<u8>) -> Result<Self> { Self::from_indices(&indices) }
}

// ─── FrequencyData ───────────────────────────────────────────────────────────

/// Structured recurrence parameters. The `type` tag names the frequency kind
/// the payload belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FrequencyData {
  Daily,
  Weekly {
    #[serde(rename = "daysOfWeek")]
    days_of_week: WeekdaySet,
  },
  Custom {
    /// 1–365, enforced at write time.
    interval: u16,
    unit:     IntervalUnit,
  },
}

impl FrequencyData {
  /// The frequency kind this payload's tag names.
  pub fn frequency(&self) -> Frequency {
    match self {
      Self::Daily => Frequency::Daily,
      Self::Weekly { .. } => Frequency::Weekly,
      Self::Custom { .. } => Frequency::Custom,
    }
  }
}

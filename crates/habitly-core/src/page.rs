//! Keyset pagination over habits.
//!
//! Pages are ordered by `created_at` descending with `id` descending as the
//! tie-break. Backends fetch `limit + 1` rows; the extra row only signals that
//! another page exists and is never returned. The cursor names the last row
//! that *was* returned, so the next page resumes strictly after it.

use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::{
  Error, Result,
  habit::Habit,
  validate::ValidationErrors,
};

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 100;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Opaque position in the (`created_at` desc, `id` desc) traversal.
///
/// On the wire this is URL-safe base64 of `<rfc3339 micros>|<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
  pub created_at: DateTime<Utc>,
  pub id:         Uuid,
}

impl Cursor {
  /// The cursor positioned at `habit`.
  pub fn at(habit: &Habit) -> Self { Self { created_at: habit.created_at, id: habit.id } }

  /// Whether `habit` lies strictly after this cursor in traversal order.
  pub fn admits(&self, habit: &Habit) -> bool {
    (habit.created_at, habit.id) < (self.created_at, self.id)
  }

  pub fn encode(&self) -> String {
    let raw = format!(
      "{}|{}",
      self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
      self.id.hyphenated()
    );
    B64.encode(raw)
  }

  pub fn decode(token: &str) -> Result<Self> {
    let bytes = B64.decode(token).map_err(|_| Error::InvalidCursor)?;
    let raw = std::str::from_utf8(&bytes).map_err(|_| Error::InvalidCursor)?;
    let (at, id) = raw.split_once('|').ok_or(Error::InvalidCursor)?;
    Ok(Self {
      created_at: DateTime::parse_from_rfc3339(at)
        .map_err(|_| Error::InvalidCursor)?
        .with_timezone(&Utc),
      id:         Uuid::parse_str(id).map_err(|_| Error::InvalidCursor)?,
    })
  }
}

impl fmt::Display for Cursor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.encode()) }
}

impl FromStr for Cursor {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::decode(s) }
}

impl Serialize for Cursor {
  fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&self.encode())
  }
}

impl<'de> Deserialize<'de> for Cursor {
  fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
    let token = String::deserialize(d)?;
    Self::decode(&token).map_err(serde::de::Error::custom)
  }
}

// ─── PageRequest ─────────────────────────────────────────────────────────────

/// A validated page size and optional resume position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub limit:  u32,
  pub cursor: Option<Cursor>,
}

impl Default for PageRequest {
  fn default() -> Self { Self { limit: DEFAULT_PAGE_LIMIT, cursor: None } }
}

impl PageRequest {
  /// Validate raw query parameters. `limit` defaults to 50 and must lie in
  /// 1–100; `cursor` must be a token previously issued by this service.
  pub fn new(limit: Option<&str>, cursor: Option<&str>) -> Result<Self, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let limit = match limit.filter(|l| !l.is_empty()).map(str::parse::<u32>) {
      None => DEFAULT_PAGE_LIMIT,
      Some(Ok(n)) if (1..=MAX_PAGE_LIMIT).contains(&n) => n,
      Some(_) => {
        errors.push("limit", format!("limit must be an integer between 1 and {MAX_PAGE_LIMIT}"));
        DEFAULT_PAGE_LIMIT
      }
    };

    let cursor = match cursor.filter(|c| !c.is_empty()).map(Cursor::decode) {
      Some(Ok(c)) => Some(c),
      Some(Err(_)) => {
        errors.push("cursor", "cursor is not a valid page token");
        None
      }
      None => None,
    };

    errors.into_result(Self { limit, cursor })
  }

  /// Rows a backend should fetch: one more than the page holds.
  pub fn fetch_limit(&self) -> usize { self.limit as usize + 1 }
}

// ─── Page ────────────────────────────────────────────────────────────────────

/// One page of results. `next_cursor` is absent on the last page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub items:       Vec<T>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub next_cursor: Option<Cursor>,
}

impl Page<Habit> {
  /// Build a page from up to `limit + 1` ordered rows.
  pub fn from_overfetch(mut rows: Vec<Habit>, limit: u32) -> Self {
    let limit = limit as usize;
    let next_cursor = if rows.len() > limit {
      rows.truncate(limit);
      rows.last().map(Cursor::at)
    } else {
      None
    };
    Self { items: rows, next_cursor }
  }
}

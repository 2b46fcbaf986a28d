//! The recurrence evaluator: is this habit due on a given date?
//!
//! | frequency | due when |
//! |-----------|----------|
//! | `daily`   | always |
//! | `weekly`  | the date's weekday (0 = Sunday) is in `daysOfWeek` |
//! | `custom`  | never completed, or `date - date(lastCompletedAt) >= interval * unit` whole days |
//!
//! This table is authoritative: the SQLite backend pushes the same rules into
//! its query predicate and both paths are tested against the same scenarios.
//! The evaluator never reads the clock; callers resolve "today" themselves.

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  frequency::{Frequency, FrequencyData},
  habit::Habit,
  page::{Page, PageRequest},
};

/// Decide whether a habit with the given rule is due on `date`.
///
/// A `frequency` that disagrees with the payload's tag is a data-integrity
/// violation; such a habit is reported as not due.
pub fn is_due(
  frequency: Frequency,
  data: &FrequencyData,
  date: NaiveDate,
  last_completed_at: Option<DateTime<Utc>>,
) -> bool {
  match (frequency, data) {
    (Frequency::Daily, FrequencyData::Daily) => true,

    // Same-day completion is not consulted for weekly habits.
    (Frequency::Weekly, FrequencyData::Weekly { days_of_week }) => {
      days_of_week.contains(date.weekday())
    }

    (Frequency::Custom, FrequencyData::Custom { interval, unit }) => {
      match last_completed_at {
        None => true,
        Some(at) => {
          let gap = (date - at.date_naive()).num_days();
          gap >= i64::from(*interval) * unit.days()
        }
      }
    }

    (Frequency::Daily | Frequency::Weekly | Frequency::Custom, _) => false,
  }
}

/// In-process form of the due-today listing: select `owner_id`'s habits due on
/// `date`, in `created_at` desc / `id` desc order, one keyset page at a time.
///
/// `habits` may be in any order and may include other owners' habits.
pub fn select_due<'a>(
  habits: impl IntoIterator<Item = &'a Habit>,
  owner_id: Uuid,
  date: NaiveDate,
  page: PageRequest,
) -> Page<Habit> {
  let mut rows: Vec<Habit> = habits
    .into_iter()
    .filter(|h| h.owner_id == owner_id)
    .filter(|h| page.cursor.is_none_or(|c| c.admits(h)))
    .filter(|h| h.is_due_on(date))
    .cloned()
    .collect();

  rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
  rows.truncate(page.fetch_limit());

  Page::from_overfetch(rows, page.limit)
}

//! Write-time validation of habit input.
//!
//! Raw request bodies deserialize into [`CreateHabit`], whose numeric fields
//! are deliberately wide so that out-of-range values surface as named field
//! errors rather than opaque parse failures. [`CreateHabit::validate`] is the
//! only way to obtain a [`NewHabit`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  frequency::{Frequency, FrequencyData, IntervalUnit, WeekdaySet},
  habit::{Color, NewHabit},
};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_MAX_CHARS: usize = 50;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const INTERVAL_MAX: i64 = 365;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// One violated rule, keyed by the offending field's wire name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

/// Every rule an input violated, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn single(field: &'static str, message: impl Into<String>) -> Self {
    let mut errors = Self::default();
    errors.push(field, message);
    errors
  }

  pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.push(FieldError { field, message: message.into() });
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.iter() }

  /// `Ok(value)` if nothing was recorded, otherwise `Err(self)`.
  pub fn into_result<T>(self, value: T) -> Result<T, Self> {
    if self.is_empty() { Ok(value) } else { Err(self) }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("validation failed")?;
    for (i, e) in self.0.iter().enumerate() {
      let sep = if i == 0 { ": " } else { "; " };
      write!(f, "{sep}{}: {}", e.field, e.message)?;
    }
    Ok(())
  }
}

impl std::error::Error for ValidationErrors {}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Body of a create-habit request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabit {
  pub name:           String,
  #[serde(default)]
  pub description:    Option<String>,
  pub color:          String,
  pub frequency:      Frequency,
  /// May be omitted for a daily habit.
  #[serde(default)]
  pub frequency_data: Option<FrequencyDataInput>,
}

/// Unvalidated counterpart of [`FrequencyData`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FrequencyDataInput {
  Daily,
  Weekly {
    #[serde(rename = "daysOfWeek")]
    days_of_week: Vec<i64>,
  },
  Custom {
    interval: i64,
    unit:     IntervalUnit,
  },
}

impl FrequencyDataInput {
  fn frequency(&self) -> Frequency {
    match self {
      Self::Daily => Frequency::Daily,
      Self::Weekly { .. } => Frequency::Weekly,
      Self::Custom { .. } => Frequency::Custom,
    }
  }

  /// Check the payload's own shape, regardless of which frequency it was
  /// submitted under.
  fn check(&self, errors: &mut ValidationErrors) -> Option<FrequencyData> {
    match self {
      Self::Daily => Some(FrequencyData::Daily),

      Self::Weekly { days_of_week } => {
        if days_of_week.is_empty() {
          errors.push("frequencyData.daysOfWeek", "at least one day of the week must be selected");
          return None;
        }
        if days_of_week.len() > 7 {
          errors.push("frequencyData.daysOfWeek", "no more than 7 days of the week can be selected");
          return None;
        }
        if days_of_week.iter().any(|d| !(0..=6).contains(d)) {
          errors.push("frequencyData.daysOfWeek", "days of the week must be between 0 and 6");
          return None;
        }
        let indices: Vec<u8> = days_of_week.iter().map(|&d| d as u8).collect();
        match WeekdaySet::from_indices(&indices) {
          Ok(days_of_week) => Some(FrequencyData::Weekly { days_of_week }),
          Err(_) => {
            errors.push("frequencyData.daysOfWeek", "duplicate days of the week are not allowed");
            None
          }
        }
      }

      Self::Custom { interval, unit } => {
        if !(1..=INTERVAL_MAX).contains(interval) {
          errors.push(
            "frequencyData.interval",
            format!("interval must be between 1 and {INTERVAL_MAX}"),
          );
          return None;
        }
        Some(FrequencyData::Custom { interval: *interval as u16, unit: *unit })
      }
    }
  }
}

impl CreateHabit {
  /// Validate every field and, if all rules hold, produce the insertable
  /// habit for `owner_id`.
  pub fn validate(self, owner_id: Uuid) -> Result<NewHabit, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name_len = self.name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
      errors.push(
        "name",
        format!("name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters long"),
      );
    }

    if let Some(d) = &self.description
      && d.chars().count() > DESCRIPTION_MAX_CHARS
    {
      errors.push(
        "description",
        format!("description must be at most {DESCRIPTION_MAX_CHARS} characters long"),
      );
    }

    let color = match self.color.parse::<Color>() {
      Ok(c) => Some(c),
      Err(_) => {
        errors.push("color", "color must be a valid hex code such as #1a2b3c");
        None
      }
    };

    let checked = self.frequency_data.as_ref().map(|fd| fd.check(&mut errors));

    let tag_matches = match (self.frequency, &self.frequency_data) {
      (Frequency::Daily, None) => true,
      (_, None) => false,
      (frequency, Some(fd)) => fd.frequency() == frequency,
    };
    if !tag_matches {
      errors.push("frequencyData", "frequency data does not match the selected frequency");
    }

    let frequency_data = match checked {
      None => Some(FrequencyData::Daily),
      Some(data) => data,
    };

    match (errors.is_empty(), color, frequency_data) {
      (true, Some(color), Some(frequency_data)) => Ok(NewHabit {
        owner_id,
        name: self.name,
        description: self.description,
        color,
        frequency_data,
      }),
      _ => Err(errors),
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn input(v: serde_json::Value) -> CreateHabit { serde_json::from_value(v).unwrap() }

  fn fields(errs: &ValidationErrors) -> Vec<&'static str> { errs.iter().map(|e| e.field).collect() }

  #[test]
  fn daily_without_payload_is_accepted() {
    let owner = Uuid::new_v4();
    let habit = input(json!({ "name": "Read", "color": "#112233", "frequency": "daily" }))
      .validate(owner)
      .unwrap();
    assert_eq!(habit.owner_id, owner);
    assert_eq!(habit.frequency_data, FrequencyData::Daily);
    assert_eq!(habit.frequency(), Frequency::Daily);
  }

  #[test]
  fn weekly_with_custom_payload_is_rejected() {
    let errs = input(json!({
      "name": "Read",
      "color": "#112233",
      "frequency": "weekly",
      "frequencyData": { "type": "custom", "interval": 3, "unit": "days" }
    }))
    .validate(Uuid::new_v4())
    .unwrap_err();
    assert_eq!(fields(&errs), ["frequencyData"]);
  }

  #[test]
  fn weekly_without_payload_is_rejected() {
    let errs = input(json!({ "name": "Read", "color": "#112233", "frequency": "weekly" }))
      .validate(Uuid::new_v4())
      .unwrap_err();
    assert_eq!(fields(&errs), ["frequencyData"]);
  }

  #[test]
  fn weekday_rules() {
    for days in [json!([]), json!([0, 1, 2, 3, 4, 5, 6, 0]), json!([7]), json!([-1]), json!([2, 2])] {
      let errs = input(json!({
        "name": "Gym",
        "color": "#abcdef",
        "frequency": "weekly",
        "frequencyData": { "type": "weekly", "daysOfWeek": days }
      }))
      .validate(Uuid::new_v4())
      .unwrap_err();
      assert_eq!(fields(&errs), ["frequencyData.daysOfWeek"], "{days}");
    }
  }

  #[test]
  fn interval_rules() {
    for interval in [0, -4, 366] {
      let errs = input(json!({
        "name": "Haircut",
        "color": "#abcdef",
        "frequency": "custom",
        "frequencyData": { "type": "custom", "interval": interval, "unit": "weeks" }
      }))
      .validate(Uuid::new_v4())
      .unwrap_err();
      assert_eq!(fields(&errs), ["frequencyData.interval"], "{interval}");
    }

    let ok = input(json!({
      "name": "Haircut",
      "color": "#abcdef",
      "frequency": "custom",
      "frequencyData": { "type": "custom", "interval": 365, "unit": "days" }
    }))
    .validate(Uuid::new_v4())
    .unwrap();
    assert_eq!(ok.frequency_data, FrequencyData::Custom { interval: 365, unit: IntervalUnit::Days });
  }

  #[test]
  fn every_violation_is_reported() {
    let errs = input(json!({
      "name": "ab",
      "description": "x".repeat(501),
      "color": "red",
      "frequency": "daily"
    }))
    .validate(Uuid::new_v4())
    .unwrap_err();
    assert_eq!(fields(&errs), ["name", "description", "color"]);
    assert!(errs.to_string().starts_with("validation failed: name:"));
  }

  #[test]
  fn name_length_counts_characters() {
    let name = "é".repeat(50);
    assert!(input(json!({ "name": name, "color": "#000000", "frequency": "daily" }))
      .validate(Uuid::new_v4())
      .is_ok());
  }
}

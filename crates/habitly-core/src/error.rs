//! Error types for `habitly-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a habit named {0:?} already exists")]
  HabitNameTaken(String),

  #[error("an account for {0:?} already exists")]
  EmailTaken(String),

  #[error("invalid weekday set: {0}")]
  InvalidWeekdays(String),

  #[error("invalid color: {0:?}")]
  InvalidColor(String),

  #[error("invalid cursor")]
  InvalidCursor,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `habitly-store-sqlite`.

use habitly_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] habitly_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown frequency: {0:?}")]
  UnknownFrequency(String),
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool {
    matches!(
      self,
      Error::Core(habitly_core::Error::HabitNameTaken(_) | habitly_core::Error::EmailTaken(_))
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

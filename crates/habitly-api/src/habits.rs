//! Handlers for `/api/habits` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/habits` | 201 + habit; 409 on a duplicate name; 422 on invalid input |
//! | `GET`  | `/api/habits` | `?limit&cursor` |
//! | `GET`  | `/api/habits/today` | `?limit&cursor&date=YYYY-MM-DD`, date defaults to today (UTC) |

use axum::{
  Json,
  extract::{Query, State, rejection::JsonRejection},
  http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use habitly_core::{
  habit::Habit,
  page::{Page, PageRequest},
  store::HabitStore,
  validate::{CreateHabit, ValidationErrors},
};
use serde::Deserialize;

use crate::{AppState, auth::Authenticated, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/habits`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Authenticated(owner_id): Authenticated,
  body: Result<Json<CreateHabit>, JsonRejection>,
) -> Result<(StatusCode, Json<Habit>), ApiError>
where
  S: HabitStore + 'static,
{
  let Json(input) = body.map_err(|e| ValidationErrors::single("body", e.body_text()))?;
  let new_habit = input.validate(owner_id)?;

  if state
    .store
    .find_by_owner_and_name(owner_id, &new_habit.name)
    .await
    .map_err(ApiError::from_store)?
    .is_some()
  {
    return Err(ApiError::Conflict(
      habitly_core::Error::HabitNameTaken(new_habit.name).to_string(),
    ));
  }

  // A concurrent create can still win the race; the unique index reports it
  // as a conflict.
  let habit = state.store.insert(new_habit).await.map_err(ApiError::from_store)?;

  tracing::info!(habit_id = %habit.id, %owner_id, frequency = %habit.frequency, "habit created");
  Ok((StatusCode::CREATED, Json(habit)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub limit:  Option<String>,
  pub cursor: Option<String>,
}

impl ListParams {
  fn page_request(&self) -> Result<PageRequest, ValidationErrors> {
    PageRequest::new(self.limit.as_deref(), self.cursor.as_deref())
  }
}

/// `GET /api/habits[?limit=<n>&cursor=<token>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Authenticated(owner_id): Authenticated,
  Query(params): Query<ListParams>,
) -> Result<Json<Page<Habit>>, ApiError>
where
  S: HabitStore + 'static,
{
  let page = params.page_request()?;
  let habits = state
    .store
    .list_by_owner(owner_id, page)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(habits))
}

// ─── Due today ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TodayParams {
  #[serde(flatten)]
  pub page: ListParams,
  pub date: Option<String>,
}

/// `GET /api/habits/today[?date=YYYY-MM-DD&limit=<n>&cursor=<token>]`
pub async fn today<S>(
  State(state): State<AppState<S>>,
  Authenticated(owner_id): Authenticated,
  Query(params): Query<TodayParams>,
) -> Result<Json<Page<Habit>>, ApiError>
where
  S: HabitStore + 'static,
{
  let mut errors = ValidationErrors::default();

  let page = params.page.page_request().unwrap_or_else(|e| {
    for f in e.iter() {
      errors.push(f.field, f.message.clone());
    }
    PageRequest::default()
  });

  let date = match params.date.as_deref().filter(|d| !d.is_empty()) {
    None => Utc::now().date_naive(),
    Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap_or_else(|_| {
      errors.push("date", "date must be formatted as YYYY-MM-DD");
      NaiveDate::MIN
    }),
  };

  errors.into_result(())?;

  let habits = state
    .store
    .list_due_today(owner_id, date, page)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(habits))
}
